//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may be partial: missing fields get their compiled default.

mod logging;
mod obs;

pub use logging::*;
pub use obs::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// Loaded from `~/.obs-deck/settings.json` with defaults applied for missing
/// fields. Environment variables override specific values. Example:
///
/// ```json
/// {
///   "obs": { "host": "studio.local", "port": 4455, "password": "hunter2" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeckSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// OBS connection settings.
    pub obs: ObsSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: deck_core::constants::NAME.to_string(),
            obs: ObsSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl DeckSettings {
    /// Reject values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.obs.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("obs.host must not be empty".into()));
        }
        if self.obs.port == 0 {
            return Err(SettingsError::InvalidValue(
                "obs.port must be between 1 and 65535".into(),
            ));
        }
        Ok(())
    }
}
