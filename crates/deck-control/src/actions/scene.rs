//! Scene dispatcher.

use std::sync::Arc;

use tracing::instrument;

use super::{change, query, require_name};
use crate::errors::Result;
use crate::manager::ConnectionManager;

/// Program/preview scene switching and scene list management.
#[derive(Clone, Debug)]
pub struct SceneActions {
    manager: Arc<ConnectionManager>,
}

impl SceneActions {
    /// Dispatcher over `manager`.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Switch the program scene.
    #[instrument(skip(self))]
    pub async fn set_current_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set current scene to \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        change(operation, obs.set_current_program_scene(scene_name)).await
    }

    /// Current program scene.
    pub async fn get_current_scene(&self) -> Result<String> {
        let obs = self.manager.require_handle()?;
        query("get current scene", obs.get_current_program_scene()).await
    }

    /// Switch the preview scene. OBS rejects this outside studio mode and the
    /// rejection is returned as is.
    #[instrument(skip(self))]
    pub async fn set_preview_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("set preview scene to \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        change(operation, obs.set_current_preview_scene(scene_name)).await
    }

    /// Current preview scene.
    pub async fn get_preview_scene(&self) -> Result<String> {
        let obs = self.manager.require_handle()?;
        query("get preview scene", obs.get_current_preview_scene()).await
    }

    /// Scene names in the order OBS reports them.
    pub async fn list_scenes(&self) -> Result<Vec<String>> {
        let obs = self.manager.require_handle()?;
        let list = query("list scenes", obs.get_scene_list()).await?;
        Ok(list.names())
    }

    /// Create an empty scene.
    #[instrument(skip(self))]
    pub async fn create_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("create scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        change(operation, obs.create_scene(scene_name)).await
    }

    /// Remove a scene.
    #[instrument(skip(self))]
    pub async fn remove_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.manager.require_handle()?;
        let operation = format!("remove scene \"{scene_name}\"");
        require_name(&operation, "scene name", scene_name)?;
        change(operation, obs.remove_scene(scene_name)).await
    }
}
