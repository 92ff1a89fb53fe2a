//! Button actions.
//!
//! An [`Action`] is what a front-end button triggers. The dispatch layer reads
//! it but never mutates it; layout and display fields are carried so a whole
//! profile can round-trip through the core untouched.

use serde::{Deserialize, Serialize};

use crate::ids::ActionId;
use crate::properties::{PropertyMap, PropertyValue};

/// Property key naming the operation an action performs.
pub const OPERATION_KEY: &str = "operation";

/// Kind of button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Press triggers one operation.
    #[default]
    Normal,
    /// Opens a nested page of buttons.
    Folder,
    /// Runs several child actions.
    Combine,
    /// Continuous control (slider, dial).
    Gauge,
}

impl ActionType {
    /// Wire name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Folder => "FOLDER",
            Self::Combine => "COMBINE",
            Self::Gauge => "GAUGE",
        }
    }
}

/// Grid placement of a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPosition {
    /// Zero-based row.
    pub row: u32,
    /// Zero-based column.
    pub col: u32,
    /// Rows covered.
    pub row_span: u32,
    /// Columns covered.
    pub col_span: u32,
}

impl Default for ActionPosition {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            row_span: 1,
            col_span: 1,
        }
    }
}

/// How a button is drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetadata {
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    /// Label alignment (`TOP`, `CENTER`, `BOTTOM`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text_alignment: Option<String>,
    /// Icon file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// CSS-style background color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// A button-triggerable unit of work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Action id.
    pub id: ActionId,
    /// Button kind.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Grid placement.
    #[serde(flatten)]
    pub position: ActionPosition,
    /// Display fields.
    #[serde(flatten)]
    pub display: DisplayMetadata,
    /// Operation and its parameters.
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    /// Plugin that owns the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    /// Plugin version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Action {
    /// Build an action with default layout and no properties.
    pub fn new(id: impl Into<ActionId>, action_type: ActionType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_type,
            name: name.into(),
            position: ActionPosition::default(),
            display: DisplayMetadata::default(),
            properties: PropertyMap::new(),
            plugin_id: None,
            version: None,
        }
    }

    /// Builder-style property setter.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let _ = self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Look up a string property.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    /// The `operation` property, if set.
    pub fn operation(&self) -> Option<&str> {
        self.str_property(OPERATION_KEY)
    }
}
