//! Action dispatch table.
//!
//! Maps an [`Action`]'s type and `operation` property to one dispatcher
//! method. Operation parameters are sibling properties of `operation`:
//!
//! | Property        | Used by                                          |
//! |-----------------|--------------------------------------------------|
//! | `scene_name`    | scene operations, visibility by id               |
//! | `input_name`    | mute, volume                                     |
//! | `source_name`   | visibility by name                               |
//! | `scene_item_id` | visibility by id                                 |
//! | `visible`       | `set_source_visibility` (default `true`)         |
//! | `muted`         | `mute` (default `true`)                          |
//! | `volume_db`     | `set_volume`                                     |
//! | `caption`       | `send_caption`                                   |
//!
//! obs-websocket 4.x and 5.x request names are accepted as aliases for the
//! stable operation ids, so profiles written against either protocol keep
//! working.

use std::sync::Arc;

use deck_core::messages::{ActionTriggerPayload, Message, MessageError, ProfilePayload, SuccessPayload};
use deck_core::{Action, ActionType, PropertyMap, PropertyValue};
use tracing::{debug, instrument, warn};

use crate::actions::{SceneActions, SourceActions, StreamActions};
use crate::errors::{ControlError, Result};
use crate::manager::ConnectionManager;
use crate::outcome::ActionOutcome;

/// Everything a button can ask OBS to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Switch the program scene.
    SwitchScene,
    /// Switch the preview scene (studio mode).
    SetPreviewScene,
    /// Create a scene.
    CreateScene,
    /// Remove a scene.
    RemoveScene,
    /// Start streaming.
    StartStream,
    /// Stop streaming.
    StopStream,
    /// Toggle streaming.
    ToggleStream,
    /// Send a stream caption.
    SendCaption,
    /// Start recording.
    StartRecord,
    /// Stop recording.
    StopRecord,
    /// Toggle recording.
    ToggleRecord,
    /// Pause recording.
    PauseRecord,
    /// Resume recording.
    ResumeRecord,
    /// Toggle recording pause.
    ToggleRecordPause,
    /// Mute an input (or unmute with `muted: false`).
    Mute,
    /// Unmute an input.
    Unmute,
    /// Toggle input mute.
    ToggleMute,
    /// Show or hide a scene item.
    SetSourceVisibility,
    /// Toggle a scene item.
    ToggleSourceVisibility,
    /// Set input volume in dB.
    SetVolume,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Self; 20] = [
        Self::SwitchScene,
        Self::SetPreviewScene,
        Self::CreateScene,
        Self::RemoveScene,
        Self::StartStream,
        Self::StopStream,
        Self::ToggleStream,
        Self::SendCaption,
        Self::StartRecord,
        Self::StopRecord,
        Self::ToggleRecord,
        Self::PauseRecord,
        Self::ResumeRecord,
        Self::ToggleRecordPause,
        Self::Mute,
        Self::Unmute,
        Self::ToggleMute,
        Self::SetSourceVisibility,
        Self::ToggleSourceVisibility,
        Self::SetVolume,
    ];

    /// Stable operation id.
    pub fn id(self) -> &'static str {
        match self {
            Self::SwitchScene => "switch_scene",
            Self::SetPreviewScene => "set_preview_scene",
            Self::CreateScene => "create_scene",
            Self::RemoveScene => "remove_scene",
            Self::StartStream => "start_stream",
            Self::StopStream => "stop_stream",
            Self::ToggleStream => "toggle_stream",
            Self::SendCaption => "send_caption",
            Self::StartRecord => "start_record",
            Self::StopRecord => "stop_record",
            Self::ToggleRecord => "toggle_record",
            Self::PauseRecord => "pause_record",
            Self::ResumeRecord => "resume_record",
            Self::ToggleRecordPause => "toggle_record_pause",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::ToggleMute => "toggle_mute",
            Self::SetSourceVisibility => "set_source_visibility",
            Self::ToggleSourceVisibility => "toggle_source_visibility",
            Self::SetVolume => "set_volume",
        }
    }

    /// Action type this operation belongs to.
    pub fn action_type(self) -> ActionType {
        match self {
            Self::SetVolume => ActionType::Gauge,
            _ => ActionType::Normal,
        }
    }

    /// Resolve an operation id or protocol alias.
    pub fn resolve(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(op) = Self::ALL.into_iter().find(|op| op.id() == name) {
            return Some(op);
        }
        let op = match name {
            "setCurrentScene" | "SetCurrentScene" | "SetCurrentProgramScene" => Self::SwitchScene,
            "setPreviewScene" | "SetPreviewScene" | "SetCurrentPreviewScene" => Self::SetPreviewScene,
            "CreateScene" => Self::CreateScene,
            "RemoveScene" => Self::RemoveScene,
            "StartStreaming" | "StartStream" => Self::StartStream,
            "StopStreaming" | "StopStream" => Self::StopStream,
            "StartStopStreaming" | "ToggleStream" => Self::ToggleStream,
            "SendStreamCaption" => Self::SendCaption,
            "StartRecording" | "StartRecord" => Self::StartRecord,
            "StopRecording" | "StopRecord" => Self::StopRecord,
            "StartStopRecording" | "ToggleRecord" => Self::ToggleRecord,
            "PauseRecording" | "PauseRecord" => Self::PauseRecord,
            "ResumeRecording" | "ResumeRecord" => Self::ResumeRecord,
            "ToggleRecordPause" => Self::ToggleRecordPause,
            "setMute" | "SetMute" | "SetInputMute" => Self::Mute,
            "toggleMute" | "ToggleMute" | "ToggleInputMute" => Self::ToggleMute,
            "setVolume" | "SetVolume" | "SetInputVolume" => Self::SetVolume,
            "setSourceRender" | "SetSourceRender" | "SetSceneItemRender" | "SetSceneItemEnabled" => {
                Self::SetSourceVisibility
            }
            _ => return None,
        };
        Some(op)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Typed reads of an action's merged properties.
struct Params<'a> {
    operation: Operation,
    properties: &'a PropertyMap,
}

impl Params<'_> {
    fn invalid(&self, reason: String) -> ControlError {
        ControlError::invalid(self.operation.id(), reason)
    }

    fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key).filter(|v| !matches!(v, PropertyValue::Null))
    }

    fn text(&self, key: &str) -> Result<&str> {
        self.optional_text(key)?
            .ok_or_else(|| self.invalid(format!("missing property \"{key}\"")))
    }

    fn optional_text(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("property \"{key}\" must be a string, got {}", value.kind()))),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.invalid(format!("property \"{key}\" must be a boolean, got {}", value.kind()))),
        }
    }

    fn number(&self, key: &str) -> Result<f64> {
        let value = self
            .get(key)
            .ok_or_else(|| self.invalid(format!("missing property \"{key}\"")))?;
        value
            .as_f64()
            .ok_or_else(|| self.invalid(format!("property \"{key}\" must be a number, got {}", value.kind())))
    }

    fn optional_integer(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("property \"{key}\" must be an integer, got {}", value.kind()))),
        }
    }
}

/// Runs actions against the shared connection.
#[derive(Clone, Debug)]
pub struct ActionDispatcher {
    manager: Arc<ConnectionManager>,
    scenes: SceneActions,
    streams: StreamActions,
    sources: SourceActions,
}

impl ActionDispatcher {
    /// Dispatcher with one façade per domain over `manager`.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            scenes: SceneActions::new(Arc::clone(&manager)),
            streams: StreamActions::new(Arc::clone(&manager)),
            sources: SourceActions::new(Arc::clone(&manager)),
            manager,
        }
    }

    /// Scene façade.
    pub fn scenes(&self) -> &SceneActions {
        &self.scenes
    }

    /// Stream/record façade.
    pub fn streams(&self) -> &StreamActions {
        &self.streams
    }

    /// Source/input façade.
    pub fn sources(&self) -> &SourceActions {
        &self.sources
    }

    /// Look up the operation an action performs.
    pub fn operation_for(action: &Action) -> Result<Operation> {
        match action.action_type {
            ActionType::Folder | ActionType::Combine => {
                return Err(ControlError::invalid(
                    "trigger action",
                    format!("{} actions are handled by the front end", action.action_type.as_str()),
                ));
            }
            ActionType::Normal | ActionType::Gauge => {}
        }

        let name = action
            .operation()
            .ok_or_else(|| ControlError::invalid("trigger action", "action has no \"operation\" property"))?;
        let op = Operation::resolve(name)
            .ok_or_else(|| ControlError::invalid("trigger action", format!("unknown operation \"{name}\"")))?;
        if op.action_type() != action.action_type {
            return Err(ControlError::invalid(
                op.id(),
                format!(
                    "operation belongs to {} actions, not {}",
                    op.action_type().as_str(),
                    action.action_type.as_str()
                ),
            ));
        }
        Ok(op)
    }

    /// Run `action` with its own properties.
    pub async fn trigger(&self, action: &Action) -> Result<ActionOutcome> {
        self.trigger_with(action, &PropertyMap::new()).await
    }

    /// Run `action`, with `overrides` replacing matching properties.
    #[instrument(skip_all, fields(action_id = %action.id, action_name = %action.name))]
    pub async fn trigger_with(&self, action: &Action, overrides: &PropertyMap) -> Result<ActionOutcome> {
        let operation = Self::operation_for(action)?;
        if !self.manager.is_connected() {
            return Err(ControlError::NotConnected);
        }

        let mut properties = action.properties.clone();
        properties.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        let params = Params {
            operation,
            properties: &properties,
        };
        debug!(%operation, "dispatching action");
        self.run(&params).await
    }

    async fn run(&self, p: &Params<'_>) -> Result<ActionOutcome> {
        match p.operation {
            Operation::SwitchScene => {
                let scene = p.text("scene_name")?;
                self.scenes.set_current_scene(scene).await?;
                Ok(ActionOutcome::new(format!("switched to scene \"{scene}\"")).with("scene_name", scene))
            }
            Operation::SetPreviewScene => {
                let scene = p.text("scene_name")?;
                self.scenes.set_preview_scene(scene).await?;
                Ok(ActionOutcome::new(format!("previewing scene \"{scene}\"")).with("scene_name", scene))
            }
            Operation::CreateScene => {
                let scene = p.text("scene_name")?;
                self.scenes.create_scene(scene).await?;
                Ok(ActionOutcome::new(format!("created scene \"{scene}\"")))
            }
            Operation::RemoveScene => {
                let scene = p.text("scene_name")?;
                self.scenes.remove_scene(scene).await?;
                Ok(ActionOutcome::new(format!("removed scene \"{scene}\"")))
            }
            Operation::StartStream => {
                self.streams.start_stream().await?;
                Ok(ActionOutcome::new("stream started"))
            }
            Operation::StopStream => {
                self.streams.stop_stream().await?;
                Ok(ActionOutcome::new("stream stopped"))
            }
            Operation::ToggleStream => {
                let active = self.streams.toggle_stream().await?;
                let message = if active { "stream started" } else { "stream stopped" };
                Ok(ActionOutcome::new(message).with("active", active))
            }
            Operation::SendCaption => {
                let caption = p.text("caption")?;
                self.streams.send_caption(caption).await?;
                Ok(ActionOutcome::new("caption sent"))
            }
            Operation::StartRecord => {
                self.streams.start_record().await?;
                Ok(ActionOutcome::new("recording started"))
            }
            Operation::StopRecord => {
                let path = self.streams.stop_record().await?;
                let outcome = ActionOutcome::new("recording stopped");
                Ok(match path {
                    Some(path) => outcome.with("output_path", path),
                    None => outcome,
                })
            }
            Operation::ToggleRecord => {
                let active = self.streams.toggle_record().await?;
                let message = if active { "recording started" } else { "recording stopped" };
                Ok(ActionOutcome::new(message).with("active", active))
            }
            Operation::PauseRecord => {
                self.streams.pause_record().await?;
                Ok(ActionOutcome::new("recording paused"))
            }
            Operation::ResumeRecord => {
                self.streams.resume_record().await?;
                Ok(ActionOutcome::new("recording resumed"))
            }
            Operation::ToggleRecordPause => {
                let paused = self.streams.toggle_record_pause().await?;
                let message = if paused { "recording paused" } else { "recording resumed" };
                Ok(ActionOutcome::new(message).with("paused", paused))
            }
            Operation::Mute | Operation::Unmute => {
                let input = p.text("input_name")?;
                let muted = p.operation == Operation::Mute && p.flag("muted", true)?;
                self.sources.set_mute(input, muted).await?;
                let verb = if muted { "muted" } else { "unmuted" };
                Ok(ActionOutcome::new(format!("{verb} \"{input}\"")).with("muted", muted))
            }
            Operation::ToggleMute => {
                let input = p.text("input_name")?;
                let muted = self.sources.toggle_mute(input).await?;
                let verb = if muted { "muted" } else { "unmuted" };
                Ok(ActionOutcome::new(format!("{verb} \"{input}\"")).with("muted", muted))
            }
            Operation::SetVolume => {
                let input = p.text("input_name")?;
                let volume_db = p.number("volume_db")?;
                self.sources.set_volume(input, volume_db).await?;
                Ok(ActionOutcome::new(format!("set \"{input}\" to {volume_db} dB")).with("volume_db", volume_db))
            }
            Operation::SetSourceVisibility => {
                let visible = p.flag("visible", true)?;
                self.set_visibility(p, Some(visible)).await
            }
            Operation::ToggleSourceVisibility => self.set_visibility(p, None).await,
        }
    }

    /// Set (`Some`) or toggle (`None`) a scene item.
    ///
    /// The target is `scene_item_id` in `scene_name`, or `source_name` in
    /// `scene_name`, or `source_name` in the current program scene.
    async fn set_visibility(&self, p: &Params<'_>, visible: Option<bool>) -> Result<ActionOutcome> {
        let scene = p.optional_text("scene_name")?;
        let source = p.optional_text("source_name")?;
        let item_id = p.optional_integer("scene_item_id")?;

        let (label, visible) = match (scene, source, item_id) {
            (Some(scene), _, Some(id)) => {
                let visible = self.apply_by_id(scene, id, visible).await?;
                (format!("item {id} in \"{scene}\""), visible)
            }
            (Some(scene), Some(source), None) => {
                let id = self.sources.scene_item_id(scene, source).await?;
                let visible = self.apply_by_id(scene, id, visible).await?;
                (format!("\"{source}\" in \"{scene}\""), visible)
            }
            (None, Some(source), None) => {
                let visible = match visible {
                    Some(v) => {
                        self.sources.set_visibility_by_name(source, v).await?;
                        v
                    }
                    None => self.sources.toggle_visibility_by_name(source).await?,
                };
                (format!("\"{source}\""), visible)
            }
            _ => {
                return Err(p.invalid(
                    "needs \"source_name\", or \"scene_name\" with \"source_name\" or \"scene_item_id\"".into(),
                ));
            }
        };

        let verb = if visible { "showing" } else { "hiding" };
        Ok(ActionOutcome::new(format!("{verb} {label}")).with("visible", visible))
    }

    async fn apply_by_id(&self, scene: &str, id: i64, visible: Option<bool>) -> Result<bool> {
        match visible {
            Some(v) => {
                self.sources.set_source_visibility(scene, id, v).await?;
                Ok(v)
            }
            None => self.sources.toggle_source_visibility(scene, id).await,
        }
    }

    /// Handle an `ACTION_TRIGGER` for `profile` and build the reply message.
    ///
    /// Control failures become an `ERROR` message; only encoding the reply
    /// can fail.
    pub async fn handle_trigger(
        &self,
        profile: &ProfilePayload,
        trigger: &ActionTriggerPayload,
    ) -> std::result::Result<Message, MessageError> {
        let result = match profile.action(&trigger.action_id) {
            Some(action) => self.trigger_with(action, &trigger.properties).await,
            None => Err(ControlError::invalid(
                "trigger action",
                format!("no action \"{}\" in profile \"{}\"", trigger.action_id, profile.id),
            )),
        };

        match result {
            Ok(outcome) => Message::success(&SuccessPayload::from(outcome)),
            Err(err) => {
                warn!(action_id = %trigger.action_id, error = %err, "action failed");
                Message::error(&err.to_error_payload())
            }
        }
    }
}
