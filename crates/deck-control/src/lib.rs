//! # deck-control
//!
//! Connection manager and action dispatch layer.
//!
//! - [`ConnectionManager`]: owns the one OBS session; connect, disconnect,
//!   status, and lifecycle observers
//! - [`SceneActions`], [`StreamActions`], [`SourceActions`]: façades that turn
//!   domain operations into obs-websocket requests
//! - [`ActionDispatcher`]: maps a button [`Action`](deck_core::Action) to one
//!   of those operations
//! - [`ControlError`]: `NotConnected`, `AlreadyConnected`, `InvalidParameter`,
//!   `TransportFailure`, each with a stable code

#![deny(unsafe_code)]

pub mod actions;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod manager;
pub mod outcome;

#[cfg(test)]
pub(crate) mod testutil;

pub use actions::{SceneActions, SourceActions, StreamActions};
pub use config::ConnectionConfig;
pub use dispatch::{ActionDispatcher, Operation};
pub use errors::{ControlError, Result};
pub use manager::{ConnectionManager, ConnectionStatus};
pub use outcome::ActionOutcome;
