//! Typed request results and events.
//!
//! Field names follow obs-websocket's camelCase `responseData` keys so each
//! struct deserializes straight from a response.

use std::time::Duration;

use deck_core::PropertyMap;
use serde::{Deserialize, Serialize};

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to connect and how to authenticate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    /// obs-websocket host.
    pub host: String,
    /// obs-websocket port.
    pub port: u16,
    /// Password, if OBS has authentication enabled.
    pub password: Option<String>,
    /// Deadline for the handshake and for each request.
    pub request_timeout: Duration,
}

impl ConnectOptions {
    /// Options with the default request timeout.
    pub fn new(host: impl Into<String>, port: u16, password: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// WebSocket URL of the endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Result of `GetVersion`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionInfo {
    /// OBS Studio version.
    pub obs_version: String,
    /// obs-websocket plugin version.
    pub obs_web_socket_version: String,
    /// Negotiated RPC version.
    pub rpc_version: u32,
    /// Platform name.
    pub platform: String,
    /// Platform description.
    pub platform_description: String,
    /// Requests the server understands.
    pub available_requests: Vec<String>,
}

/// One entry of `GetSceneList`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    /// Scene name.
    pub scene_name: String,
    /// Position index reported by OBS.
    #[serde(default)]
    pub scene_index: i64,
}

/// Result of `GetSceneList`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneList {
    /// Current program scene.
    pub current_program_scene_name: Option<String>,
    /// Current preview scene; `None` outside studio mode.
    pub current_preview_scene_name: Option<String>,
    /// Scenes in the order OBS returned them.
    pub scenes: Vec<SceneEntry>,
}

impl SceneList {
    /// Scene names in peer order.
    pub fn names(&self) -> Vec<String> {
        self.scenes.iter().map(|s| s.scene_name.clone()).collect()
    }
}

/// Result of `GetStreamStatus`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamStatus {
    /// Whether the stream output is running.
    #[serde(rename = "outputActive")]
    pub active: bool,
    /// Whether the output is reconnecting.
    #[serde(rename = "outputReconnecting")]
    pub reconnecting: bool,
    /// Elapsed time as `HH:MM:SS.mmm`.
    #[serde(rename = "outputTimecode")]
    pub timecode: String,
    /// Elapsed milliseconds.
    #[serde(rename = "outputDuration")]
    pub duration_ms: u64,
    /// Bytes sent.
    #[serde(rename = "outputBytes")]
    pub bytes: u64,
}

/// Result of `GetRecordStatus`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordStatus {
    /// Whether recording is running.
    #[serde(rename = "outputActive")]
    pub active: bool,
    /// Whether recording is paused.
    #[serde(rename = "outputPaused")]
    pub paused: bool,
    /// Elapsed time as `HH:MM:SS.mmm`.
    #[serde(rename = "outputTimecode")]
    pub timecode: String,
    /// Elapsed milliseconds.
    #[serde(rename = "outputDuration")]
    pub duration_ms: u64,
    /// Bytes written.
    #[serde(rename = "outputBytes")]
    pub bytes: u64,
}

/// One entry of `GetInputList`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputInfo {
    /// Input name.
    pub input_name: String,
    /// Versioned input kind (e.g. `wasapi_input_capture`).
    #[serde(default)]
    pub input_kind: String,
    /// Kind without version suffix.
    #[serde(default)]
    pub unversioned_input_kind: String,
}

/// Result of `GetInputVolume`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputVolume {
    /// Linear multiplier.
    #[serde(rename = "inputVolumeMul")]
    pub mul: f64,
    /// Level in decibels.
    #[serde(rename = "inputVolumeDb")]
    pub db: f64,
}

/// Result of `GetInputSettings`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputSettings {
    /// Input kind.
    pub input_kind: String,
    /// Raw settings object (only non-default values).
    pub input_settings: PropertyMap,
}

/// Asynchronous notification from OBS.
#[derive(Clone, Debug, PartialEq)]
pub enum ObsEvent {
    /// Program scene switched.
    CurrentProgramSceneChanged {
        /// New program scene.
        scene_name: String,
    },
    /// Preview scene switched (studio mode).
    CurrentPreviewSceneChanged {
        /// New preview scene.
        scene_name: String,
    },
    /// A scene was created.
    SceneCreated {
        /// Scene name.
        scene_name: String,
    },
    /// A scene was removed.
    SceneRemoved {
        /// Scene name.
        scene_name: String,
    },
    /// Stream output state changed.
    StreamStateChanged {
        /// Whether the stream is running.
        active: bool,
        /// Detailed state (e.g. `OBS_WEBSOCKET_OUTPUT_STARTED`).
        state: String,
    },
    /// Record output state changed.
    RecordStateChanged {
        /// Whether recording is running.
        active: bool,
        /// Detailed state.
        state: String,
    },
    /// An input was muted or unmuted.
    InputMuteStateChanged {
        /// Input name.
        input_name: String,
        /// New mute state.
        muted: bool,
    },
    /// An input's volume changed.
    InputVolumeChanged {
        /// Input name.
        input_name: String,
        /// New level in decibels.
        volume_db: f64,
    },
    /// A scene item was shown or hidden.
    SceneItemEnabledStateChanged {
        /// Scene containing the item.
        scene_name: String,
        /// Item id.
        scene_item_id: i64,
        /// New visibility.
        enabled: bool,
    },
    /// OBS is shutting down.
    ExitStarted,
    /// Any event without a typed variant.
    Other {
        /// obs-websocket event type.
        event_type: String,
    },
    /// The connection ended. Always the last event on a transport.
    ConnectionClosed {
        /// Close reason, if known.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_url() {
        let opts = ConnectOptions::new("localhost", 4455, None);
        assert_eq!(opts.url(), "ws://localhost:4455");
        assert_eq!(opts.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn scene_list_keeps_peer_order() {
        let list: SceneList = serde_json::from_value(json!({
            "currentProgramSceneName": "Starting",
            "currentPreviewSceneName": null,
            "scenes": [
                { "sceneIndex": 2, "sceneName": "Starting" },
                { "sceneIndex": 1, "sceneName": "Gameplay" },
                { "sceneIndex": 0, "sceneName": "BRB" }
            ]
        }))
        .unwrap();
        assert_eq!(list.names(), ["Starting", "Gameplay", "BRB"]);
        assert!(list.current_preview_scene_name.is_none());
    }

    #[test]
    fn record_status_from_response() {
        let status: RecordStatus = serde_json::from_value(json!({
            "outputActive": true,
            "outputPaused": true,
            "outputTimecode": "00:01:02.003",
            "outputDuration": 62003,
            "outputBytes": 1024
        }))
        .unwrap();
        assert!(status.active);
        assert!(status.paused);
        assert_eq!(status.duration_ms, 62_003);
    }

    #[test]
    fn stream_status_tolerates_missing_fields() {
        let status: StreamStatus = serde_json::from_value(json!({ "outputActive": false })).unwrap();
        assert!(!status.active);
        assert!(status.timecode.is_empty());
    }

    #[test]
    fn input_settings_keep_raw_map() {
        let settings: InputSettings = serde_json::from_value(json!({
            "inputKind": "text_ft2_source_v2",
            "inputSettings": { "text": "LIVE", "font": { "size": 48 } }
        }))
        .unwrap();
        assert_eq!(settings.input_settings["text"].as_str(), Some("LIVE"));
    }
}
