//! Front-end message envelope and payloads.
//!
//! Every message exchanged with a deck client is a [`Message`]: a
//! [`MessageType`] tag, optional free-text header/body, and a payload kept as
//! raw JSON until the receiver knows which payload struct to decode into.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::ids::{ActionId, ClientId, ProfileId};
use crate::properties::PropertyMap;

/// Errors from building or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The message carried no payload but one was required.
    #[error("{message_type} message has no payload")]
    MissingPayload {
        /// Wire name of the message type.
        message_type: &'static str,
    },

    /// The payload did not match the expected shape.
    #[error("invalid {message_type} payload: {source}")]
    InvalidPayload {
        /// Wire name of the message type.
        message_type: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Message kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Client announces itself.
    Connect,
    /// Client leaves.
    Disconnect,
    /// Keep-alive.
    Heartbeat,
    /// A button was pressed.
    ActionTrigger,
    /// Request a profile.
    ProfileLoad,
    /// Profile contents changed.
    ProfileUpdate,
    /// Switch active profile.
    ProfileSwitch,
    /// Read configuration.
    ConfigGet,
    /// Write configuration.
    ConfigUpdate,
    /// Theme changed.
    ThemeUpdate,
    /// Positive response.
    Success,
    /// Negative response.
    Error,
}

impl MessageType {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Disconnect => "DISCONNECT",
            Self::Heartbeat => "HEARTBEAT",
            Self::ActionTrigger => "ACTION_TRIGGER",
            Self::ProfileLoad => "PROFILE_LOAD",
            Self::ProfileUpdate => "PROFILE_UPDATE",
            Self::ProfileSwitch => "PROFILE_SWITCH",
            Self::ConfigGet => "CONFIG_GET",
            Self::ConfigUpdate => "CONFIG_UPDATE",
            Self::ThemeUpdate => "THEME_UPDATE",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// Envelope exchanged with deck clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message kind.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Optional header text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Optional body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Raw payload, decoded by [`Message::decode_payload`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Message {
    /// Message with no header, body, or payload.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            header: None,
            body: None,
            payload: None,
        }
    }

    /// Message carrying an encoded payload.
    pub fn with_payload<T: Serialize>(message_type: MessageType, payload: &T) -> Result<Self, MessageError> {
        let payload = serde_json::to_value(payload).map_err(MessageError::Encode)?;
        Ok(Self {
            payload: Some(payload),
            ..Self::new(message_type)
        })
    }

    /// `SUCCESS` response.
    pub fn success(payload: &SuccessPayload) -> Result<Self, MessageError> {
        Self::with_payload(MessageType::Success, payload)
    }

    /// `ERROR` response.
    pub fn error(payload: &ErrorPayload) -> Result<Self, MessageError> {
        Self::with_payload(MessageType::Error, payload)
    }

    /// Decode the payload into `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, MessageError> {
        let message_type = self.message_type.as_str();
        let raw = self
            .payload
            .clone()
            .ok_or(MessageError::MissingPayload { message_type })?;
        serde_json::from_value(raw).map_err(|source| MessageError::InvalidPayload { message_type, source })
    }
}

/// Payload of `CONNECT`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectPayload {
    /// Client id.
    pub client_id: ClientId,
    /// Display name of the client.
    pub client_name: String,
    /// Client software version.
    pub client_version: String,
    /// Client platform (`android`, `linux`, ...).
    pub platform: String,
    /// Profile the client wants to start on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
}

/// Payload of `ACTION_TRIGGER`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTriggerPayload {
    /// Pressed action.
    pub action_id: ActionId,
    /// Profile the action belongs to.
    pub profile_id: ProfileId,
    /// Per-press property overrides.
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

/// Screen orientation of a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    Portrait,
    /// Wider than tall.
    #[default]
    Landscape,
}

/// Payload of the `PROFILE_*` messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Profile id.
    pub id: ProfileId,
    /// Profile name.
    pub name: String,
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Buttons on the profile.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Screen orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Extra profile properties.
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl ProfilePayload {
    /// Find an action on this profile.
    pub fn action(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| &a.id == id)
    }
}

/// Payload of `SUCCESS`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuccessPayload {
    /// Human-readable summary.
    pub message: String,
    /// Operation result, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PropertyMap>,
}

impl SuccessPayload {
    /// Success with no data.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Payload of `ERROR`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Underlying cause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn connect_message_decodes() {
        let raw = json!({
            "type": "CONNECT",
            "payload": {
                "clientId": "pi-1",
                "clientName": "Kitchen Pi",
                "clientVersion": "1.0.0",
                "platform": "linux"
            }
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.message_type, MessageType::Connect);
        let payload: ConnectPayload = msg.decode_payload().unwrap();
        assert_eq!(payload.client_id.as_str(), "pi-1");
        assert!(payload.profile_id.is_none());
    }

    #[test]
    fn action_trigger_accepts_property_overrides() {
        let raw = json!({
            "type": "ACTION_TRIGGER",
            "payload": {
                "actionId": "a1",
                "profileId": "p1",
                "properties": { "scene_name": "BRB" }
            }
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        let payload: ActionTriggerPayload = msg.decode_payload().unwrap();
        assert_eq!(payload.properties["scene_name"].as_str(), Some("BRB"));
    }

    #[test]
    fn missing_payload_is_reported() {
        let msg = Message::new(MessageType::ActionTrigger);
        let err = msg.decode_payload::<ActionTriggerPayload>().unwrap_err();
        assert_matches!(err, MessageError::MissingPayload { message_type: "ACTION_TRIGGER" });
    }

    #[test]
    fn wrong_payload_shape_is_reported() {
        let msg = Message {
            payload: Some(json!({ "rows": "three" })),
            ..Message::new(MessageType::ProfileLoad)
        };
        let err = msg.decode_payload::<ProfilePayload>().unwrap_err();
        assert_matches!(err, MessageError::InvalidPayload { message_type: "PROFILE_LOAD", .. });
    }

    #[test]
    fn error_message_omits_empty_fields() {
        let msg = Message::error(&ErrorPayload {
            code: "NOT_CONNECTED".into(),
            message: "not connected to OBS".into(),
            details: None,
        })
        .unwrap();
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "ERROR");
        assert!(value.get("header").is_none());
        assert!(value["payload"].get("details").is_none());
    }

    #[test]
    fn profile_lookup_by_action_id() {
        let raw = json!({
            "id": "p1",
            "name": "Main",
            "rows": 3,
            "cols": 5,
            "orientation": "portrait",
            "actions": [
                { "id": "a1", "type": "NORMAL", "name": "Go live", "row": 0, "col": 0, "rowSpan": 1, "colSpan": 1 }
            ]
        });
        let profile: ProfilePayload = serde_json::from_value(raw).unwrap();
        assert_eq!(profile.orientation, Orientation::Portrait);
        assert_eq!(profile.action(&ActionId::from("a1")).unwrap().name, "Go live");
        assert!(profile.action(&ActionId::from("zz")).is_none());
    }

    #[test]
    fn message_type_wire_names_match_serde() {
        let all = [
            MessageType::Connect,
            MessageType::Disconnect,
            MessageType::Heartbeat,
            MessageType::ActionTrigger,
            MessageType::ProfileLoad,
            MessageType::ProfileUpdate,
            MessageType::ProfileSwitch,
            MessageType::ConfigGet,
            MessageType::ConfigUpdate,
            MessageType::ThemeUpdate,
            MessageType::Success,
            MessageType::Error,
        ];
        for ty in all {
            assert_eq!(serde_json::to_value(ty).unwrap(), json!(ty.as_str()));
        }
    }
}
