//! obs-websocket session over the `obws` client.
//!
//! `obws` owns the socket, the Hello/Identify handshake, and request
//! correlation. [`WsTransport`] puts a deadline on every call, maps failures
//! into [`TransportError`], and republishes events as [`ObsEvent`]s on its
//! own broadcast channel, ending with [`ObsEvent::ConnectionClosed`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deck_core::PropertyMap;
use deck_core::properties::{map_from_json, map_to_json};
use futures::{Stream, StreamExt};
use obws::Client;
use obws::client::{ConnectConfig, HandshakeError};
use obws::error::Error as ObwsError;
use obws::events::Event;
use obws::requests::inputs::{InputId, SetSettings, Volume};
use obws::requests::scene_items::{Id, SetEnabled};
use obws::requests::scenes::SceneId;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::{Connector, ObsTransport};
use crate::error::{Result, TransportError};
use crate::types::{
    ConnectOptions, InputInfo, InputSettings, InputVolume, ObsEvent, RecordStatus, SceneEntry,
    SceneList, StreamStatus, VersionInfo,
};

/// Close code obs-websocket uses when identification fails on the password.
pub const CLOSE_AUTHENTICATION_FAILED: u16 = 4009;

/// Event channel capacity. Slow subscribers lag rather than block the socket.
const EVENT_CAPACITY: usize = 64;

/// Opens [`WsTransport`] sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, options: &ConnectOptions) -> Result<Arc<dyn ObsTransport>> {
        let transport = WsTransport::connect(options).await?;
        Ok(Arc::new(transport))
    }
}

/// End-of-session bookkeeping shared with the event forwarder.
struct Lifecycle {
    closed: AtomicBool,
    closing: AtomicBool,
    event_tx: broadcast::Sender<ObsEvent>,
}

impl Lifecycle {
    /// Mark the session closed and emit `ConnectionClosed` once.
    fn finish(&self, reason: &str) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let reason = if self.closing.load(Ordering::Acquire) {
            "closed by client"
        } else {
            reason
        };
        info!(%reason, "obs-websocket session ended");
        let _ = self.event_tx.send(ObsEvent::ConnectionClosed {
            reason: reason.to_string(),
        });
    }
}

/// A live, identified obs-websocket session.
pub struct WsTransport {
    client: RwLock<Option<Arc<Client>>>,
    lifecycle: Arc<Lifecycle>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
    request_timeout: Duration,
}

impl WsTransport {
    /// Connect, identify, and start forwarding events.
    pub async fn connect(options: &ConnectOptions) -> Result<Self> {
        let url = options.url();
        let client = Client::connect_with_config(ConnectConfig {
            host: options.host.as_str(),
            port: options.port,
            dangerous: None,
            password: options.password.as_deref(),
            event_subscriptions: None,
            broadcast_capacity: EVENT_CAPACITY,
            connect_timeout: options.request_timeout,
        })
        .await
        .map_err(|e| connect_error(&url, options.request_timeout, e))?;

        let events = client
            .events()
            .map_err(|e| connect_error(&url, options.request_timeout, e))?;
        info!(%url, "identified with obs-websocket");

        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let lifecycle = Arc::new(Lifecycle {
            closed: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            event_tx,
        });
        let forwarder = tokio::spawn(forward(events, Arc::clone(&lifecycle)));

        Ok(Self {
            client: RwLock::new(Some(Arc::new(client))),
            lifecycle,
            forwarder: Mutex::new(Some(forwarder)),
            request_timeout: options.request_timeout,
        })
    }

    fn client(&self) -> Result<Arc<Client>> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.client.read().clone().ok_or(TransportError::Closed)
    }

    /// Run one `obws` call under the request deadline.
    async fn call<T>(
        &self,
        request_type: &str,
        call: impl Future<Output = std::result::Result<T, ObwsError>>,
    ) -> Result<T> {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| TransportError::Timeout {
                timeout_ms: millis(self.request_timeout),
                context: request_type.to_string(),
            })?
            .map_err(|e| request_error(request_type, e))
    }
}

#[async_trait]
impl ObsTransport for WsTransport {
    fn subscribe(&self) -> broadcast::Receiver<ObsEvent> {
        self.lifecycle.event_tx.subscribe()
    }

    fn is_closed(&self) -> bool {
        self.lifecycle.closed.load(Ordering::Acquire)
    }

    async fn close(&self) {
        if self.lifecycle.closing.swap(true, Ordering::AcqRel) {
            return;
        }

        let client = self.client.write().take();
        if let Some(client) = client {
            match Arc::try_unwrap(client) {
                // Waits for the reader task, which ends the event stream
                Ok(mut client) => {
                    let _ = client.disconnect().await;
                }
                // Requests still in flight; the socket goes with the last of them
                Err(in_flight) => {
                    debug!("closing with requests in flight");
                    drop(in_flight);
                }
            }
        }

        let forwarder = self.forwarder.lock().take();
        if let Some(forwarder) = forwarder {
            forwarder.abort();
            let _ = forwarder.await;
        }
        self.lifecycle.finish("closed by client");
    }

    async fn get_version(&self) -> Result<VersionInfo> {
        let obs = self.client()?;
        let version = self.call("GetVersion", obs.general().version()).await?;
        Ok(VersionInfo {
            obs_version: version.obs_version.to_string(),
            obs_web_socket_version: version.obs_web_socket_version.to_string(),
            rpc_version: version.rpc_version,
            platform: version.platform,
            platform_description: version.platform_description,
            available_requests: version.available_requests,
        })
    }

    async fn get_current_program_scene(&self) -> Result<String> {
        let obs = self.client()?;
        let scene = self
            .call("GetCurrentProgramScene", obs.scenes().current_program_scene())
            .await?;
        Ok(scene.id.name)
    }

    async fn set_current_program_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.client()?;
        self.call(
            "SetCurrentProgramScene",
            obs.scenes().set_current_program_scene(scene_name),
        )
        .await
    }

    async fn get_current_preview_scene(&self) -> Result<String> {
        let obs = self.client()?;
        let scene = self
            .call("GetCurrentPreviewScene", obs.scenes().current_preview_scene())
            .await?;
        Ok(scene.id.name)
    }

    async fn set_current_preview_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.client()?;
        self.call(
            "SetCurrentPreviewScene",
            obs.scenes().set_current_preview_scene(scene_name),
        )
        .await
    }

    async fn get_scene_list(&self) -> Result<SceneList> {
        let obs = self.client()?;
        let list = self.call("GetSceneList", obs.scenes().list()).await?;
        Ok(SceneList {
            current_program_scene_name: list.current_program_scene.map(|s| s.name),
            current_preview_scene_name: list.current_preview_scene.map(|s| s.name),
            scenes: list
                .scenes
                .into_iter()
                .map(|scene| SceneEntry {
                    scene_name: scene.id.name,
                    scene_index: i64::try_from(scene.index).unwrap_or_default(),
                })
                .collect(),
        })
    }

    async fn create_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.client()?;
        let _ = self.call("CreateScene", obs.scenes().create(scene_name)).await?;
        Ok(())
    }

    async fn remove_scene(&self, scene_name: &str) -> Result<()> {
        let obs = self.client()?;
        self.call("RemoveScene", obs.scenes().remove(SceneId::Name(scene_name)))
            .await
    }

    async fn get_stream_status(&self) -> Result<StreamStatus> {
        let obs = self.client()?;
        let status = self.call("GetStreamStatus", obs.streaming().status()).await?;
        Ok(StreamStatus {
            active: status.active,
            reconnecting: status.reconnecting,
            timecode: timecode(clamp_millis(status.timecode.whole_milliseconds())),
            duration_ms: clamp_millis(status.duration.whole_milliseconds()),
            bytes: status.bytes,
        })
    }

    async fn start_stream(&self) -> Result<()> {
        let obs = self.client()?;
        self.call("StartStream", obs.streaming().start()).await
    }

    async fn stop_stream(&self) -> Result<()> {
        let obs = self.client()?;
        self.call("StopStream", obs.streaming().stop()).await
    }

    async fn toggle_stream(&self) -> Result<bool> {
        let obs = self.client()?;
        self.call("ToggleStream", obs.streaming().toggle()).await
    }

    async fn send_stream_caption(&self, caption_text: &str) -> Result<()> {
        let obs = self.client()?;
        self.call("SendStreamCaption", obs.streaming().send_caption(caption_text))
            .await
    }

    async fn get_record_status(&self) -> Result<RecordStatus> {
        let obs = self.client()?;
        let status = self.call("GetRecordStatus", obs.recording().status()).await?;
        Ok(RecordStatus {
            active: status.active,
            paused: status.paused,
            timecode: timecode(clamp_millis(status.timecode.whole_milliseconds())),
            duration_ms: clamp_millis(status.duration.whole_milliseconds()),
            bytes: status.bytes,
        })
    }

    async fn start_record(&self) -> Result<()> {
        let obs = self.client()?;
        self.call("StartRecord", obs.recording().start()).await
    }

    async fn stop_record(&self) -> Result<Option<String>> {
        let obs = self.client()?;
        let path = self.call("StopRecord", obs.recording().stop()).await?;
        Ok(Some(path).filter(|p| !p.is_empty()))
    }

    async fn toggle_record(&self) -> Result<bool> {
        let obs = self.client()?;
        self.call("ToggleRecord", obs.recording().toggle()).await
    }

    async fn pause_record(&self) -> Result<()> {
        let obs = self.client()?;
        self.call("PauseRecord", obs.recording().pause()).await
    }

    async fn resume_record(&self) -> Result<()> {
        let obs = self.client()?;
        self.call("ResumeRecord", obs.recording().resume()).await
    }

    async fn toggle_record_pause(&self) -> Result<()> {
        let obs = self.client()?;
        let _ = self
            .call("ToggleRecordPause", obs.recording().toggle_pause())
            .await?;
        Ok(())
    }

    async fn get_input_mute(&self, input_name: &str) -> Result<bool> {
        let obs = self.client()?;
        self.call("GetInputMute", obs.inputs().muted(InputId::Name(input_name)))
            .await
    }

    async fn set_input_mute(&self, input_name: &str, muted: bool) -> Result<()> {
        let obs = self.client()?;
        self.call(
            "SetInputMute",
            obs.inputs().set_muted(InputId::Name(input_name), muted),
        )
        .await
    }

    async fn toggle_input_mute(&self, input_name: &str) -> Result<bool> {
        let obs = self.client()?;
        self.call(
            "ToggleInputMute",
            obs.inputs().toggle_mute(InputId::Name(input_name)),
        )
        .await
    }

    async fn get_input_volume(&self, input_name: &str) -> Result<InputVolume> {
        let obs = self.client()?;
        let volume = self
            .call("GetInputVolume", obs.inputs().volume(InputId::Name(input_name)))
            .await?;
        Ok(InputVolume {
            mul: f64::from(volume.mul),
            db: f64::from(volume.db),
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn set_input_volume_db(&self, input_name: &str, volume_db: f64) -> Result<()> {
        let obs = self.client()?;
        self.call(
            "SetInputVolume",
            obs.inputs()
                .set_volume(InputId::Name(input_name), Volume::Db(volume_db as f32)),
        )
        .await
    }

    async fn get_input_list(&self, input_kind: Option<&str>) -> Result<Vec<InputInfo>> {
        let obs = self.client()?;
        let inputs = self.call("GetInputList", obs.inputs().list(input_kind)).await?;
        Ok(inputs
            .into_iter()
            .map(|input| InputInfo {
                input_name: input.id.name,
                input_kind: input.kind,
                unversioned_input_kind: input.unversioned_kind,
            })
            .collect())
    }

    async fn get_input_settings(&self, input_name: &str) -> Result<InputSettings> {
        let obs = self.client()?;
        let settings = self
            .call(
                "GetInputSettings",
                obs.inputs().settings::<Value>(InputId::Name(input_name)),
            )
            .await?;
        Ok(InputSettings {
            input_kind: settings.kind,
            input_settings: map_from_json(settings.settings).unwrap_or_default(),
        })
    }

    async fn set_input_settings(
        &self,
        input_name: &str,
        settings: PropertyMap,
        overlay: bool,
    ) -> Result<()> {
        let obs = self.client()?;
        let settings = map_to_json(settings);
        self.call(
            "SetInputSettings",
            obs.inputs().set_settings(SetSettings {
                input: InputId::Name(input_name),
                settings: &settings,
                overlay: Some(overlay),
            }),
        )
        .await
    }

    async fn get_scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64> {
        let obs = self.client()?;
        self.call(
            "GetSceneItemId",
            obs.scene_items().id(Id {
                scene: SceneId::Name(scene_name),
                source: source_name,
                search_offset: None,
            }),
        )
        .await
    }

    async fn get_scene_item_enabled(&self, scene_name: &str, scene_item_id: i64) -> Result<bool> {
        let obs = self.client()?;
        self.call(
            "GetSceneItemEnabled",
            obs.scene_items()
                .enabled(SceneId::Name(scene_name), scene_item_id),
        )
        .await
    }

    async fn set_scene_item_enabled(
        &self,
        scene_name: &str,
        scene_item_id: i64,
        enabled: bool,
    ) -> Result<()> {
        let obs = self.client()?;
        self.call(
            "SetSceneItemEnabled",
            obs.scene_items().set_enabled(SetEnabled {
                scene: SceneId::Name(scene_name),
                item_id: scene_item_id,
                enabled,
            }),
        )
        .await
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("closed", &self.is_closed())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.get_mut().take() {
            forwarder.abort();
        }
    }
}

/// Republish `obws` events until its stream ends, then report the close.
async fn forward(events: impl Stream<Item = Event>, lifecycle: Arc<Lifecycle>) {
    let mut events = std::pin::pin!(events);
    let mut reason = "connection lost";
    while let Some(event) = events.next().await {
        match event {
            Event::ServerStopping => reason = "closed by server",
            Event::ServerStopped => break,
            event => {
                // No subscribers is fine
                let _ = lifecycle.event_tx.send(convert_event(event));
            }
        }
    }
    lifecycle.finish(reason);
}

fn convert_event(event: Event) -> ObsEvent {
    match event {
        Event::CurrentProgramSceneChanged { id } => {
            ObsEvent::CurrentProgramSceneChanged { scene_name: id.name }
        }
        Event::CurrentPreviewSceneChanged { id } => {
            ObsEvent::CurrentPreviewSceneChanged { scene_name: id.name }
        }
        Event::SceneCreated { id, .. } => ObsEvent::SceneCreated { scene_name: id.name },
        Event::SceneRemoved { id, .. } => ObsEvent::SceneRemoved { scene_name: id.name },
        Event::StreamStateChanged { active, state } => ObsEvent::StreamStateChanged {
            active,
            state: wire_name(&state),
        },
        Event::RecordStateChanged { active, state, .. } => ObsEvent::RecordStateChanged {
            active,
            state: wire_name(&state),
        },
        Event::InputMuteStateChanged { id, muted } => ObsEvent::InputMuteStateChanged {
            input_name: id.name,
            muted,
        },
        Event::InputVolumeChanged { id, db, .. } => ObsEvent::InputVolumeChanged {
            input_name: id.name,
            volume_db: db,
        },
        Event::SceneItemEnableStateChanged {
            scene,
            item_id,
            enabled,
        } => ObsEvent::SceneItemEnabledStateChanged {
            scene_name: scene.name,
            scene_item_id: i64::try_from(item_id).unwrap_or_default(),
            enabled,
        },
        Event::ExitStarted => ObsEvent::ExitStarted,
        other => ObsEvent::Other {
            event_type: event_type(&other),
        },
    }
}

/// The obs-websocket spelling of a serde-tagged value.
fn wire_name(value: &impl serde::Serialize) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn event_type(event: &Event) -> String {
    serde_json::to_value(event)
        .ok()
        .and_then(|v| v["eventType"].as_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn connect_error(url: &str, timeout: Duration, err: ObwsError) -> TransportError {
    match err {
        ObwsError::Timeout => TransportError::Timeout {
            timeout_ms: millis(timeout),
            context: format!("connect to {url}"),
        },
        ObwsError::Handshake(HandshakeError::ConnectionClosed(Some(details)))
            if u16::from(details.code) == CLOSE_AUTHENTICATION_FAILED =>
        {
            TransportError::Authentication {
                reason: details.reason,
            }
        }
        other => TransportError::Connect {
            url: url.to_string(),
            reason: describe(&other),
        },
    }
}

fn request_error(request_type: &str, err: ObwsError) -> TransportError {
    match err {
        ObwsError::Api { code, message } => TransportError::Request {
            request_type: request_type.to_string(),
            code: serde_json::to_value(code)
                .ok()
                .and_then(|v| v.as_u64())
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or_default(),
            comment: message.unwrap_or_default(),
        },
        ObwsError::Disconnected | ObwsError::Send(_) | ObwsError::ReceiveMessage(_) => {
            TransportError::Closed
        }
        ObwsError::DeserializeResponse(e) => TransportError::Json(describe(&e)),
        other => TransportError::Protocol(describe(&other)),
    }
}

/// Display text of an error followed by its sources.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// `HH:MM:SS.mmm`, as OBS prints output timecodes.
fn timecode(millis: u64) -> String {
    let (secs, ms) = (millis / 1000, millis % 1000);
    format!(
        "{:02}:{:02}:{:02}.{ms:03}",
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    )
}

fn clamp_millis(millis: i128) -> u64 {
    u64::try_from(millis).unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation)]
fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
