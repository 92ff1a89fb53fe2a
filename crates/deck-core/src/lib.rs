//! # deck-core
//!
//! Foundation types shared by every obs-deck crate.
//!
//! - **Branded IDs**: `ActionId`, `ProfileId`, `ClientId` as newtypes for type safety
//! - **Properties**: [`PropertyValue`] / [`PropertyMap`], the typed stand-in for
//!   schema-less JSON maps (action properties, raw input settings)
//! - **Actions**: [`Action`] and [`ActionType`], the button-triggerable unit of work
//! - **Messages**: [`Message`] envelope and its typed payloads
//! - **Buttons**: in-memory button grid layout
//! - **Logging**: `tracing` subscriber bootstrap

#![deny(unsafe_code)]

pub mod action;
pub mod buttons;
pub mod constants;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod properties;

pub use action::{Action, ActionPosition, ActionType, DisplayMetadata};
pub use ids::{ActionId, ClientId, ProfileId};
pub use messages::{Message, MessageError, MessageType};
pub use properties::{PropertyMap, PropertyValue};
