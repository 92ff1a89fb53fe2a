//! # deck-transport
//!
//! obs-websocket v5 session seam.
//!
//! - [`ObsTransport`]: one live session with a typed call per request
//! - [`Connector`]: opens sessions ([`WsConnector`] over the `obws` client)
//! - [`ObsEvent`]: asynchronous notifications, ending with `ConnectionClosed`
//! - [`TransportError`]: connect, auth, request, timeout, and close failures
//!
//! The wire protocol, handshake, and authentication belong to `obws`.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;
pub mod ws;

pub use client::{Connector, ObsTransport};
pub use error::{Result, TransportError};
pub use types::{
    ConnectOptions, DEFAULT_REQUEST_TIMEOUT, InputInfo, InputSettings, InputVolume, ObsEvent,
    RecordStatus, SceneEntry, SceneList, StreamStatus, VersionInfo,
};
pub use ws::{CLOSE_AUTHENTICATION_FAILED, WsConnector, WsTransport};
