//! Source and input dispatcher: audio mute/volume, scene item visibility, and
//! raw input settings.
//!
//! Visibility toggles are a read followed by a write. Two toggles racing on
//! the same item can both read the same state; OBS offers no atomic toggle for
//! scene items, so this is left as is.

use std::sync::Arc;

use deck_core::PropertyMap;
use deck_transport::{InputInfo, ObsTransport};
use tracing::{debug, instrument};

use super::{change, query, require_item_id, require_name, require_volume};
use crate::errors::Result;
use crate::manager::ConnectionManager;

/// Inputs and scene items.
#[derive(Clone, Debug)]
pub struct SourceActions {
    manager: Arc<ConnectionManager>,
}

impl SourceActions {
    /// Dispatcher over `manager`.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    // ── Audio ───────────────────────────────────────────────────────

    /// Whether `input_name` is muted.
    pub async fn get_mute(&self, input_name: &str) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        let operation = format!("get mute state of input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        query(operation, obs.get_input_mute(input_name)).await
    }

    /// Mute or unmute `input_name`.
    #[instrument(skip(self))]
    pub async fn set_mute(&self, input_name: &str, muted: bool) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let verb = if muted { "mute" } else { "unmute" };
        let operation = format!("{verb} input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        change(operation, obs.set_input_mute(input_name, muted)).await
    }

    /// Flip the mute state with OBS's own toggle. Returns the new state.
    #[instrument(skip(self))]
    pub async fn toggle_mute(&self, input_name: &str) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        let operation = format!("toggle mute for input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        change(operation, obs.toggle_input_mute(input_name)).await
    }

    /// Volume of `input_name` in dB.
    pub async fn get_volume(&self, input_name: &str) -> Result<f64> {
        let obs = self.manager.require_handle()?;
        let operation = format!("get volume for input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        let volume = query(operation, obs.get_input_volume(input_name)).await?;
        Ok(volume.db)
    }

    /// Set the volume of `input_name` in dB (−100.0 to 26.0, 0.0 is unity).
    #[instrument(skip(self))]
    pub async fn set_volume(&self, input_name: &str, volume_db: f64) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set volume for input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        require_volume(&operation, volume_db)?;
        change(operation, obs.set_input_volume_db(input_name, volume_db)).await
    }

    // ── Scene items ─────────────────────────────────────────────────

    /// Id of `source_name` inside `scene_name`.
    pub async fn scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64> {
        let obs = self.manager.require_handle()?;
        let operation = format!("find source \"{source_name}\" in scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        require_name(&operation, "source name", source_name)?;
        query(operation, obs.get_scene_item_id(scene_name, source_name)).await
    }

    /// Whether scene item `scene_item_id` in `scene_name` is visible.
    pub async fn get_source_visibility(&self, scene_name: &str, scene_item_id: i64) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        let operation = format!("get visibility of item {scene_item_id} in scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        require_item_id(&operation, scene_item_id)?;
        query(operation, obs.get_scene_item_enabled(scene_name, scene_item_id)).await
    }

    /// Show or hide scene item `scene_item_id` in `scene_name`.
    #[instrument(skip(self))]
    pub async fn set_source_visibility(
        &self,
        scene_name: &str,
        scene_item_id: i64,
        visible: bool,
    ) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set visibility of item {scene_item_id} in scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        require_item_id(&operation, scene_item_id)?;
        change(operation, obs.set_scene_item_enabled(scene_name, scene_item_id, visible)).await
    }

    /// Flip visibility of scene item `scene_item_id`. Returns the new state.
    #[instrument(skip(self))]
    pub async fn toggle_source_visibility(&self, scene_name: &str, scene_item_id: i64) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        let operation =
            format!("toggle visibility of item {scene_item_id} in scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        require_item_id(&operation, scene_item_id)?;

        let visible = query(
            operation.clone(),
            obs.get_scene_item_enabled(scene_name, scene_item_id),
        )
        .await?;
        change(operation, obs.set_scene_item_enabled(scene_name, scene_item_id, !visible)).await?;
        Ok(!visible)
    }

    /// Show or hide `source_name` in the current program scene.
    ///
    /// The scene and item id are looked up on every call, so a scene switch
    /// between calls is always honored.
    #[instrument(skip(self))]
    pub async fn set_visibility_by_name(&self, source_name: &str, visible: bool) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set visibility of source \"{source_name}\"");
        require_name(&operation, "source name", source_name)?;

        let (scene_name, scene_item_id) = resolve(obs.as_ref(), &operation, source_name).await?;
        change(operation, obs.set_scene_item_enabled(&scene_name, scene_item_id, visible)).await
    }

    /// Flip visibility of `source_name` in the current program scene.
    /// Returns the new state.
    #[instrument(skip(self))]
    pub async fn toggle_visibility_by_name(&self, source_name: &str) -> Result<bool> {
        let obs = self.manager.require_handle()?;
        let operation = format!("toggle visibility of source \"{source_name}\"");
        require_name(&operation, "source name", source_name)?;

        let (scene_name, scene_item_id) = resolve(obs.as_ref(), &operation, source_name).await?;
        let visible = query(
            operation.clone(),
            obs.get_scene_item_enabled(&scene_name, scene_item_id),
        )
        .await?;
        change(operation, obs.set_scene_item_enabled(&scene_name, scene_item_id, !visible)).await?;
        Ok(!visible)
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// All inputs, optionally filtered by kind.
    pub async fn list_inputs(&self, input_kind: Option<&str>) -> Result<Vec<InputInfo>> {
        let obs = self.manager.require_handle()?;
        query("list inputs", obs.get_input_list(input_kind)).await
    }

    /// Raw settings of `input_name`.
    pub async fn get_input_settings(&self, input_name: &str) -> Result<PropertyMap> {
        let obs = self.manager.require_handle()?;
        let operation = format!("get settings for input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        let settings = query(operation, obs.get_input_settings(input_name)).await?;
        Ok(settings.input_settings)
    }

    /// Write raw settings. With `overlay`, keys merge into the existing
    /// settings; without it they replace them.
    #[instrument(skip(self, settings))]
    pub async fn set_input_settings(
        &self,
        input_name: &str,
        settings: PropertyMap,
        overlay: bool,
    ) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set settings for input \"{input_name}\"");
        require_name(&operation, "input name", input_name)?;
        change(operation, obs.set_input_settings(input_name, settings, overlay)).await
    }
}

/// Current program scene and the id of `source_name` in it.
async fn resolve(obs: &dyn ObsTransport, operation: &str, source_name: &str) -> Result<(String, i64)> {
    let scene_name = query(operation, obs.get_current_program_scene()).await?;
    let scene_item_id = query(operation, obs.get_scene_item_id(&scene_name, source_name)).await?;
    debug!(%scene_name, scene_item_id, "resolved scene item");
    Ok((scene_name, scene_item_id))
}
