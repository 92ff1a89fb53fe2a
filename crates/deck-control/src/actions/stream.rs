//! Stream and record dispatcher.

use std::sync::Arc;

use deck_transport::{RecordStatus, StreamStatus};
use tracing::instrument;

use super::{change, query, require_name};
use crate::errors::Result;
use crate::manager::ConnectionManager;

/// Streaming and recording outputs.
#[derive(Clone, Debug)]
pub struct StreamActions {
    manager: Arc<ConnectionManager>,
}

impl StreamActions {
    /// Dispatcher over `manager`.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    // ── Streaming ───────────────────────────────────────────────────

    /// Start the stream output.
    #[instrument(skip(self))]
    pub async fn start_stream(&self) -> Result<()> {
        let obs = self.manager.require_handle()?;
        change("start streaming".into(), obs.start_stream()).await
    }

    /// Stop the stream output.
    #[instrument(skip(self))]
    pub async fn stop_stream(&self) -> Result<()> {
        let obs = self.manager.require_handle()?;
        change("stop streaming".into(), obs.stop_stream()).await
    }

    /// Toggle the stream output. Returns whether it is now active.
    #[instrument(skip(self))]
    pub async fn toggle_stream(&self) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        change("toggle streaming".into(), obs.toggle_stream()).await
    }

    /// Stream output status.
    pub async fn stream_status(&self) -> Result<StreamStatus> {
        let obs = self.manager.require_handle()?;
        query("get stream status", obs.get_stream_status()).await
    }

    /// Send a CEA-608 caption over the running stream.
    #[instrument(skip(self))]
    pub async fn send_caption(&self, caption: &str) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = "send stream caption";
        require_name(operation, "caption", caption)?;
        change(operation.into(), obs.send_stream_caption(caption)).await
    }

    // ── Recording ───────────────────────────────────────────────────

    /// Start recording.
    #[instrument(skip(self))]
    pub async fn start_record(&self) -> Result<()> {
        let obs = self.manager.require_handle()?;
        change("start recording".into(), obs.start_record()).await
    }

    /// Stop recording. Returns the output file path when OBS reports one.
    #[instrument(skip(self))]
    pub async fn stop_record(&self) -> Result<Option<String>> {
        let obs = self.manager.require_handle()?;
        change("stop recording".into(), obs.stop_record()).await
    }

    /// Toggle recording. Returns whether it is now active.
    #[instrument(skip(self))]
    pub async fn toggle_record(&self) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        change("toggle recording".into(), obs.toggle_record()).await
    }

    /// Pause the running recording.
    #[instrument(skip(self))]
    pub async fn pause_record(&self) -> Result<()> {
        let obs = self.manager.require_handle()?;
        change("pause recording".into(), obs.pause_record()).await
    }

    /// Resume a paused recording.
    #[instrument(skip(self))]
    pub async fn resume_record(&self) -> Result<()> {
        let obs = self.manager.require_handle()?;
        change("resume recording".into(), obs.resume_record()).await
    }

    /// Toggle pause, then read back the paused flag.
    ///
    /// `ToggleRecordPause` returns nothing, so this makes a second call; a
    /// concurrent pause/resume between the two may be reflected in the result.
    #[instrument(skip(self))]
    pub async fn toggle_record_pause(&self) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        change("toggle recording pause".into(), obs.toggle_record_pause()).await?;
        let status = query("get record status", obs.get_record_status()).await?;
        Ok(status.paused)
    }

    /// Record output status (`active`, `paused`).
    pub async fn record_status(&self) -> Result<RecordStatus> {
        let obs = self.manager.require_handle()?;
        query("get record status", obs.get_record_status()).await
    }
}
