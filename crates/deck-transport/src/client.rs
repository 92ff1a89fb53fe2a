//! The transport seam.
//!
//! [`ObsTransport`] is one live, identified obs-websocket session with a
//! typed call per request the control layer uses. [`Connector`] opens
//! sessions. The control layer holds a connector and never touches sockets
//! directly.

use std::sync::Arc;

use async_trait::async_trait;
use deck_core::PropertyMap;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::types::{
    ConnectOptions, InputInfo, InputSettings, InputVolume, ObsEvent, RecordStatus, SceneList,
    StreamStatus, VersionInfo,
};

/// Opens identified sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect, complete the handshake, and return the live session.
    async fn connect(&self, options: &ConnectOptions) -> Result<Arc<dyn ObsTransport>>;
}

impl std::fmt::Debug for dyn ObsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObsTransport").finish_non_exhaustive()
    }
}

/// One live obs-websocket session.
///
/// Each call names the obs-websocket request it issues. Failures reported
/// by OBS come back as [`TransportError::Request`](crate::TransportError::Request)
/// carrying that request type.
#[async_trait]
pub trait ObsTransport: Send + Sync {
    /// Receive events from now on. Ends with [`ObsEvent::ConnectionClosed`].
    fn subscribe(&self) -> broadcast::Receiver<ObsEvent>;

    /// Whether the session has ended.
    fn is_closed(&self) -> bool;

    /// End the session. Idempotent.
    async fn close(&self);

    // ── General ─────────────────────────────────────────────────────

    /// `GetVersion`.
    async fn get_version(&self) -> Result<VersionInfo>;

    // ── Scenes ──────────────────────────────────────────────────────

    /// `GetCurrentProgramScene`, returning the scene name.
    async fn get_current_program_scene(&self) -> Result<String>;

    /// `SetCurrentProgramScene`.
    async fn set_current_program_scene(&self, scene_name: &str) -> Result<()>;

    /// `GetCurrentPreviewScene`, returning the scene name. Fails outside studio mode.
    async fn get_current_preview_scene(&self) -> Result<String>;

    /// `SetCurrentPreviewScene`. Fails outside studio mode.
    async fn set_current_preview_scene(&self, scene_name: &str) -> Result<()>;

    /// `GetSceneList`.
    async fn get_scene_list(&self) -> Result<SceneList>;

    /// `CreateScene`.
    async fn create_scene(&self, scene_name: &str) -> Result<()>;

    /// `RemoveScene`.
    async fn remove_scene(&self, scene_name: &str) -> Result<()>;

    // ── Stream ──────────────────────────────────────────────────────

    /// `GetStreamStatus`.
    async fn get_stream_status(&self) -> Result<StreamStatus>;

    /// `StartStream`.
    async fn start_stream(&self) -> Result<()>;

    /// `StopStream`.
    async fn stop_stream(&self) -> Result<()>;

    /// `ToggleStream`, returning whether the stream is now active.
    async fn toggle_stream(&self) -> Result<bool>;

    /// `SendStreamCaption`.
    async fn send_stream_caption(&self, caption_text: &str) -> Result<()>;

    // ── Record ──────────────────────────────────────────────────────

    /// `GetRecordStatus`.
    async fn get_record_status(&self) -> Result<RecordStatus>;

    /// `StartRecord`.
    async fn start_record(&self) -> Result<()>;

    /// `StopRecord`, returning the output file path when OBS reports one.
    async fn stop_record(&self) -> Result<Option<String>>;

    /// `ToggleRecord`, returning whether recording is now active.
    async fn toggle_record(&self) -> Result<bool>;

    /// `PauseRecord`.
    async fn pause_record(&self) -> Result<()>;

    /// `ResumeRecord`.
    async fn resume_record(&self) -> Result<()>;

    /// `ToggleRecordPause`.
    async fn toggle_record_pause(&self) -> Result<()>;

    // ── Inputs ──────────────────────────────────────────────────────

    /// `GetInputMute`.
    async fn get_input_mute(&self, input_name: &str) -> Result<bool>;

    /// `SetInputMute`.
    async fn set_input_mute(&self, input_name: &str, muted: bool) -> Result<()>;

    /// `ToggleInputMute`, returning the new mute state.
    async fn toggle_input_mute(&self, input_name: &str) -> Result<bool>;

    /// `GetInputVolume`.
    async fn get_input_volume(&self, input_name: &str) -> Result<InputVolume>;

    /// `SetInputVolume` in decibels.
    async fn set_input_volume_db(&self, input_name: &str, volume_db: f64) -> Result<()>;

    /// `GetInputList`, optionally filtered by kind.
    async fn get_input_list(&self, input_kind: Option<&str>) -> Result<Vec<InputInfo>>;

    /// `GetInputSettings`.
    async fn get_input_settings(&self, input_name: &str) -> Result<InputSettings>;

    /// `SetInputSettings`. With `overlay`, keys are merged into the current settings.
    async fn set_input_settings(
        &self,
        input_name: &str,
        settings: PropertyMap,
        overlay: bool,
    ) -> Result<()>;

    // ── Scene items ─────────────────────────────────────────────────

    /// `GetSceneItemId`.
    async fn get_scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64>;

    /// `GetSceneItemEnabled`.
    async fn get_scene_item_enabled(&self, scene_name: &str, scene_item_id: i64) -> Result<bool>;

    /// `SetSceneItemEnabled`.
    async fn set_scene_item_enabled(
        &self,
        scene_name: &str,
        scene_item_id: i64,
        enabled: bool,
    ) -> Result<()>;
}
