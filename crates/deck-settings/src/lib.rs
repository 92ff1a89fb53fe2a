//! # deck-settings
//!
//! Layered configuration for obs-deck.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DeckSettings::default()`]
//! 2. **User file**: `~/.obs-deck/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `OBS_*` and `DECK_*` overrides
//!
//! Command-line flags are applied on top by the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
