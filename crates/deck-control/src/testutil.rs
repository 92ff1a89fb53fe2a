//! In-memory OBS for tests.
//!
//! [`FakeObs`] answers each typed call from a small state model, keyed by
//! the obs-websocket request type it stands for. Every request type is
//! recorded so tests can assert both results and the exact remote calls made.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use deck_core::PropertyMap;
use deck_core::properties::map_to_json;
use deck_transport::{
    ConnectOptions, Connector, InputInfo, InputSettings, InputVolume, ObsEvent, ObsTransport,
    RecordStatus, SceneList, StreamStatus, TransportError, VersionInfo,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{Notify, broadcast, oneshot};

type Reply = Result<Value, TransportError>;

fn fail(request_type: &str, code: u16, comment: impl Into<String>) -> Reply {
    Err(TransportError::Request {
        request_type: request_type.to_string(),
        code,
        comment: comment.into(),
    })
}

#[derive(Clone, Debug)]
pub struct FakeInput {
    pub kind: String,
    pub muted: bool,
    pub volume_db: f64,
    pub settings: Value,
}

#[derive(Clone, Debug)]
pub struct FakeItem {
    pub scene: String,
    pub source: String,
    pub id: i64,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct FakeState {
    pub scenes: Vec<String>,
    pub program: String,
    /// `Some` while studio mode is on.
    pub preview: Option<String>,
    pub streaming: bool,
    pub recording: bool,
    pub paused: bool,
    pub inputs: BTreeMap<String, FakeInput>,
    pub items: Vec<FakeItem>,
    pub captions: Vec<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        let mut inputs = BTreeMap::new();
        let _ = inputs.insert(
            "Mic/Aux".to_string(),
            FakeInput {
                kind: "pulse_input_capture".into(),
                muted: false,
                volume_db: 0.0,
                settings: json!({ "device_id": "default" }),
            },
        );
        let _ = inputs.insert(
            "Desktop Audio".to_string(),
            FakeInput {
                kind: "pulse_output_capture".into(),
                muted: false,
                volume_db: -3.0,
                settings: json!({}),
            },
        );
        let _ = inputs.insert(
            "Title".to_string(),
            FakeInput {
                kind: "text_ft2_source_v2".into(),
                muted: false,
                volume_db: 0.0,
                settings: json!({ "text": "Starting soon", "font": { "face": "Sans", "size": 48 } }),
            },
        );
        Self {
            scenes: vec!["Starting".into(), "Main".into(), "BRB".into()],
            program: "Starting".into(),
            preview: None,
            streaming: false,
            recording: false,
            paused: false,
            inputs,
            items: vec![
                FakeItem { scene: "Starting".into(), source: "Title".into(), id: 1, enabled: true },
                FakeItem { scene: "Main".into(), source: "Camera".into(), id: 3, enabled: true },
                FakeItem { scene: "Main".into(), source: "Title".into(), id: 4, enabled: false },
                FakeItem { scene: "BRB".into(), source: "Camera".into(), id: 7, enabled: false },
            ],
            captions: Vec::new(),
        }
    }
}

/// Scripted OBS peer.
pub struct FakeObs {
    pub state: Mutex<FakeState>,
    calls: Mutex<Vec<String>>,
    events: broadcast::Sender<ObsEvent>,
    closed: AtomicBool,
}

impl FakeObs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState::default()),
            calls: Mutex::new(Vec::new()),
            events: broadcast::channel(32).0,
            closed: AtomicBool::new(false),
        })
    }

    /// Request types received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Simulate OBS going away.
    pub fn drop_connection(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.events.send(ObsEvent::ConnectionClosed {
            reason: "connection lost".into(),
        });
    }

    fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    fn emit(&self, event: ObsEvent) {
        let _ = self.events.send(event);
    }

    /// Log the request type, then answer it from state.
    fn call(&self, request_type: &str, data: Value) -> Reply {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.calls.lock().push(request_type.to_string());
        self.answer(request_type, &data)
    }

    #[allow(clippy::too_many_lines)]
    fn answer(&self, request_type: &str, data: &Value) -> Reply {
        let mut s = self.state.lock();
        let text = |key: &str| data[key].as_str().unwrap_or_default().to_string();
        let scene_missing = |name: &str| format!("No source was found by the name of `{name}`.");

        match request_type {
            "GetVersion" => Ok(json!({
                "obsVersion": "30.1.2",
                "obsWebSocketVersion": "5.4.2",
                "rpcVersion": 1,
                "platform": "linux",
                "platformDescription": "Fake"
            })),
            "GetCurrentProgramScene" => Ok(json!({ "currentProgramSceneName": s.program })),
            "SetCurrentProgramScene" => {
                let name = text("sceneName");
                if !s.scenes.contains(&name) {
                    return fail(request_type, 600, scene_missing(&name));
                }
                s.program = name.clone();
                drop(s);
                self.emit(ObsEvent::CurrentProgramSceneChanged { scene_name: name });
                Ok(Value::Null)
            }
            "GetCurrentPreviewScene" => match &s.preview {
                Some(preview) => Ok(json!({ "currentPreviewSceneName": preview })),
                None => fail(request_type, 506, "Studio mode is not active."),
            },
            "SetCurrentPreviewScene" => {
                let name = text("sceneName");
                if s.preview.is_none() {
                    return fail(request_type, 506, "Studio mode is not active.");
                }
                if !s.scenes.contains(&name) {
                    return fail(request_type, 600, scene_missing(&name));
                }
                s.preview = Some(name);
                Ok(Value::Null)
            }
            "GetSceneList" => {
                let scenes: Vec<Value> = s
                    .scenes
                    .iter()
                    .enumerate()
                    .map(|(i, name)| json!({ "sceneIndex": s.scenes.len() - 1 - i, "sceneName": name }))
                    .collect();
                Ok(json!({
                    "currentProgramSceneName": s.program,
                    "currentPreviewSceneName": s.preview,
                    "scenes": scenes
                }))
            }
            "CreateScene" => {
                let name = text("sceneName");
                if s.scenes.contains(&name) {
                    return fail(request_type, 601, "A source already exists by that scene name.");
                }
                s.scenes.push(name);
                Ok(Value::Null)
            }
            "RemoveScene" => {
                let name = text("sceneName");
                let Some(index) = s.scenes.iter().position(|n| *n == name) else {
                    return fail(request_type, 600, scene_missing(&name));
                };
                let _ = s.scenes.remove(index);
                Ok(Value::Null)
            }
            "GetStreamStatus" => Ok(json!({
                "outputActive": s.streaming,
                "outputReconnecting": false,
                "outputTimecode": "00:00:00.000",
                "outputDuration": 0,
                "outputBytes": 0
            })),
            "StartStream" => {
                if s.streaming {
                    return fail(request_type, 500, "The stream output is already active.");
                }
                s.streaming = true;
                Ok(Value::Null)
            }
            "StopStream" => {
                if !s.streaming {
                    return fail(request_type, 501, "The stream output is not active.");
                }
                s.streaming = false;
                Ok(Value::Null)
            }
            "ToggleStream" => {
                s.streaming = !s.streaming;
                Ok(json!({ "outputActive": s.streaming }))
            }
            "SendStreamCaption" => {
                if !s.streaming {
                    return fail(request_type, 501, "The stream output is not active.");
                }
                s.captions.push(text("captionText"));
                Ok(Value::Null)
            }
            "GetRecordStatus" => Ok(json!({
                "outputActive": s.recording,
                "outputPaused": s.paused,
                "outputTimecode": "00:00:00.000",
                "outputDuration": 0,
                "outputBytes": 0
            })),
            "StartRecord" => {
                if s.recording {
                    return fail(request_type, 500, "The record output is already active.");
                }
                s.recording = true;
                Ok(Value::Null)
            }
            "StopRecord" => {
                if !s.recording {
                    return fail(request_type, 501, "The record output is not active.");
                }
                s.recording = false;
                s.paused = false;
                Ok(json!({ "outputPath": "/videos/fake.mkv" }))
            }
            "ToggleRecord" => {
                s.recording = !s.recording;
                s.paused = false;
                Ok(json!({ "outputActive": s.recording }))
            }
            "PauseRecord" | "ResumeRecord" | "ToggleRecordPause" => {
                if !s.recording {
                    return fail(request_type, 501, "The record output is not active.");
                }
                s.paused = match request_type {
                    "PauseRecord" => true,
                    "ResumeRecord" => false,
                    _ => !s.paused,
                };
                Ok(Value::Null)
            }
            "GetInputList" => {
                let inputs: Vec<Value> = s
                    .inputs
                    .iter()
                    .map(|(name, input)| json!({ "inputName": name, "inputKind": input.kind, "unversionedInputKind": input.kind }))
                    .collect();
                Ok(json!({ "inputs": inputs }))
            }
            "GetInputMute" | "SetInputMute" | "ToggleInputMute" | "GetInputVolume" | "SetInputVolume"
            | "GetInputSettings" | "SetInputSettings" => {
                let name = text("inputName");
                let Some(input) = s.inputs.get_mut(&name) else {
                    return fail(request_type, 600, format!("No source was found by the name of `{name}`."));
                };
                match request_type {
                    "GetInputMute" => Ok(json!({ "inputMuted": input.muted })),
                    "SetInputMute" => {
                        input.muted = data["inputMuted"].as_bool().unwrap_or_default();
                        Ok(Value::Null)
                    }
                    "ToggleInputMute" => {
                        input.muted = !input.muted;
                        Ok(json!({ "inputMuted": input.muted }))
                    }
                    "GetInputVolume" => Ok(json!({
                        "inputVolumeMul": 10f64.powf(input.volume_db / 20.0),
                        "inputVolumeDb": input.volume_db
                    })),
                    "SetInputVolume" => {
                        input.volume_db = data["inputVolumeDb"].as_f64().unwrap_or_default();
                        Ok(Value::Null)
                    }
                    "GetInputSettings" => Ok(json!({
                        "inputKind": input.kind,
                        "inputSettings": input.settings
                    })),
                    _ => {
                        let incoming = data["inputSettings"].clone();
                        if data["overlay"].as_bool().unwrap_or(true) {
                            if let (Some(current), Some(new)) = (input.settings.as_object_mut(), incoming.as_object()) {
                                for (k, v) in new {
                                    let _ = current.insert(k.clone(), v.clone());
                                }
                            }
                        } else {
                            input.settings = incoming;
                        }
                        Ok(Value::Null)
                    }
                }
            }
            "GetSceneItemId" => {
                let scene = text("sceneName");
                let source = text("sourceName");
                if !s.scenes.contains(&scene) {
                    return fail(request_type, 600, scene_missing(&scene));
                }
                match s.items.iter().find(|i| i.scene == scene && i.source == source) {
                    Some(item) => Ok(json!({ "sceneItemId": item.id })),
                    None => fail(
                        request_type,
                        600,
                        format!("No scene items were found in scene `{scene}` with the name `{source}`."),
                    ),
                }
            }
            "GetSceneItemEnabled" | "SetSceneItemEnabled" => {
                let scene = text("sceneName");
                let id = data["sceneItemId"].as_i64().unwrap_or(-1);
                let Some(item) = s.items.iter_mut().find(|i| i.scene == scene && i.id == id) else {
                    return fail(request_type, 600, format!("No scene item was found with the ID `{id}`."));
                };
                if request_type == "GetSceneItemEnabled" {
                    Ok(json!({ "sceneItemEnabled": item.enabled }))
                } else {
                    item.enabled = data["sceneItemEnabled"].as_bool().unwrap_or_default();
                    Ok(Value::Null)
                }
            }
            other => fail(other, 204, "Your request type is not valid."),
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    Ok(serde_json::from_value(value)?)
}

fn field<T: DeserializeOwned>(mut value: Value, key: &str) -> Result<T, TransportError> {
    decode(value[key].take())
}

#[async_trait]
impl ObsTransport for FakeObs {
    fn subscribe(&self) -> broadcast::Receiver<ObsEvent> {
        self.events.subscribe()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.emit(ObsEvent::ConnectionClosed {
                reason: "closed by client".into(),
            });
        }
    }

    async fn get_version(&self) -> Result<VersionInfo, TransportError> {
        decode(self.call("GetVersion", Value::Null)?)
    }

    async fn get_current_program_scene(&self) -> Result<String, TransportError> {
        field(self.call("GetCurrentProgramScene", Value::Null)?, "currentProgramSceneName")
    }

    async fn set_current_program_scene(&self, scene_name: &str) -> Result<(), TransportError> {
        self.call("SetCurrentProgramScene", json!({ "sceneName": scene_name })).map(drop)
    }

    async fn get_current_preview_scene(&self) -> Result<String, TransportError> {
        field(self.call("GetCurrentPreviewScene", Value::Null)?, "currentPreviewSceneName")
    }

    async fn set_current_preview_scene(&self, scene_name: &str) -> Result<(), TransportError> {
        self.call("SetCurrentPreviewScene", json!({ "sceneName": scene_name })).map(drop)
    }

    async fn get_scene_list(&self) -> Result<SceneList, TransportError> {
        decode(self.call("GetSceneList", Value::Null)?)
    }

    async fn create_scene(&self, scene_name: &str) -> Result<(), TransportError> {
        self.call("CreateScene", json!({ "sceneName": scene_name })).map(drop)
    }

    async fn remove_scene(&self, scene_name: &str) -> Result<(), TransportError> {
        self.call("RemoveScene", json!({ "sceneName": scene_name })).map(drop)
    }

    async fn get_stream_status(&self) -> Result<StreamStatus, TransportError> {
        decode(self.call("GetStreamStatus", Value::Null)?)
    }

    async fn start_stream(&self) -> Result<(), TransportError> {
        self.call("StartStream", Value::Null).map(drop)
    }

    async fn stop_stream(&self) -> Result<(), TransportError> {
        self.call("StopStream", Value::Null).map(drop)
    }

    async fn toggle_stream(&self) -> Result<bool, TransportError> {
        field(self.call("ToggleStream", Value::Null)?, "outputActive")
    }

    async fn send_stream_caption(&self, caption_text: &str) -> Result<(), TransportError> {
        self.call("SendStreamCaption", json!({ "captionText": caption_text })).map(drop)
    }

    async fn get_record_status(&self) -> Result<RecordStatus, TransportError> {
        decode(self.call("GetRecordStatus", Value::Null)?)
    }

    async fn start_record(&self) -> Result<(), TransportError> {
        self.call("StartRecord", Value::Null).map(drop)
    }

    async fn stop_record(&self) -> Result<Option<String>, TransportError> {
        field(self.call("StopRecord", Value::Null)?, "outputPath")
    }

    async fn toggle_record(&self) -> Result<bool, TransportError> {
        field(self.call("ToggleRecord", Value::Null)?, "outputActive")
    }

    async fn pause_record(&self) -> Result<(), TransportError> {
        self.call("PauseRecord", Value::Null).map(drop)
    }

    async fn resume_record(&self) -> Result<(), TransportError> {
        self.call("ResumeRecord", Value::Null).map(drop)
    }

    async fn toggle_record_pause(&self) -> Result<(), TransportError> {
        self.call("ToggleRecordPause", Value::Null).map(drop)
    }

    async fn get_input_mute(&self, input_name: &str) -> Result<bool, TransportError> {
        field(self.call("GetInputMute", json!({ "inputName": input_name }))?, "inputMuted")
    }

    async fn set_input_mute(&self, input_name: &str, muted: bool) -> Result<(), TransportError> {
        self.call("SetInputMute", json!({ "inputName": input_name, "inputMuted": muted }))
            .map(drop)
    }

    async fn toggle_input_mute(&self, input_name: &str) -> Result<bool, TransportError> {
        field(self.call("ToggleInputMute", json!({ "inputName": input_name }))?, "inputMuted")
    }

    async fn get_input_volume(&self, input_name: &str) -> Result<InputVolume, TransportError> {
        decode(self.call("GetInputVolume", json!({ "inputName": input_name }))?)
    }

    async fn set_input_volume_db(&self, input_name: &str, volume_db: f64) -> Result<(), TransportError> {
        self.call("SetInputVolume", json!({ "inputName": input_name, "inputVolumeDb": volume_db }))
            .map(drop)
    }

    async fn get_input_list(&self, input_kind: Option<&str>) -> Result<Vec<InputInfo>, TransportError> {
        let inputs: Vec<InputInfo> = field(self.call("GetInputList", json!({ "inputKind": input_kind }))?, "inputs")?;
        Ok(inputs
            .into_iter()
            .filter(|i| input_kind.is_none_or(|kind| i.input_kind == kind))
            .collect())
    }

    async fn get_input_settings(&self, input_name: &str) -> Result<InputSettings, TransportError> {
        decode(self.call("GetInputSettings", json!({ "inputName": input_name }))?)
    }

    async fn set_input_settings(
        &self,
        input_name: &str,
        settings: PropertyMap,
        overlay: bool,
    ) -> Result<(), TransportError> {
        self.call(
            "SetInputSettings",
            json!({ "inputName": input_name, "inputSettings": map_to_json(settings), "overlay": overlay }),
        )
        .map(drop)
    }

    async fn get_scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64, TransportError> {
        field(
            self.call("GetSceneItemId", json!({ "sceneName": scene_name, "sourceName": source_name }))?,
            "sceneItemId",
        )
    }

    async fn get_scene_item_enabled(&self, scene_name: &str, scene_item_id: i64) -> Result<bool, TransportError> {
        field(
            self.call("GetSceneItemEnabled", json!({ "sceneName": scene_name, "sceneItemId": scene_item_id }))?,
            "sceneItemEnabled",
        )
    }

    async fn set_scene_item_enabled(
        &self,
        scene_name: &str,
        scene_item_id: i64,
        enabled: bool,
    ) -> Result<(), TransportError> {
        self.call(
            "SetSceneItemEnabled",
            json!({ "sceneName": scene_name, "sceneItemId": scene_item_id, "sceneItemEnabled": enabled }),
        )
        .map(drop)
    }
}

/// Hands out the same [`FakeObs`] on every connect.
pub struct FakeConnector {
    pub obs: Arc<FakeObs>,
    connects: AtomicUsize,
    fail_with: Mutex<Option<TransportError>>,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
    entered: Notify,
}

impl FakeConnector {
    pub fn new(obs: Arc<FakeObs>) -> Arc<Self> {
        Arc::new(Self {
            obs,
            connects: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            hold: Mutex::new(None),
            entered: Notify::new(),
        })
    }

    /// Keep the next connect pending until the returned sender fires.
    pub fn pause_next_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock() = Some(rx);
        tx
    }

    /// Resolves once a connect has started.
    pub async fn connecting(&self) {
        self.entered.notified().await;
    }

    /// Make every following connect fail with `err`.
    pub fn fail_with(&self, err: TransportError) {
        *self.fail_with.lock() = Some(err);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _options: &ConnectOptions) -> Result<Arc<dyn ObsTransport>, TransportError> {
        let _ = self.connects.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let hold = self.hold.lock().take();
        if let Some(release) = hold {
            let _ = release.await;
        }
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }
        self.obs.reopen();
        Ok(Arc::clone(&self.obs) as Arc<dyn ObsTransport>)
    }
}
