//! OBS connection settings.

use serde::{Deserialize, Serialize};

use deck_core::constants::{DEFAULT_OBS_HOST, DEFAULT_OBS_PORT, DEFAULT_RECONNECT_INTERVAL_MS};

/// Where and how to reach obs-websocket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObsSettings {
    /// obs-websocket host.
    pub host: String,
    /// obs-websocket port.
    pub port: u16,
    /// obs-websocket password. Absent when authentication is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connect at startup.
    pub auto_connect: bool,
    /// Delay between reconnect attempts in milliseconds. `0` means the default.
    pub reconnect_interval_ms: u64,
}

impl Default for ObsSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_OBS_HOST.to_string(),
            port: DEFAULT_OBS_PORT,
            password: None,
            auto_connect: true,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
        }
    }
}
