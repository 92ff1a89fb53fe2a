//! In-memory button grid layout.
//!
//! The deck client edits its layout as a [`ButtonConfig`]. Loading and saving
//! it is the client's business; this module only owns the shape and the
//! lookup/upsert/delete operations on it.

use serde::{Deserialize, Serialize};

use crate::properties::PropertyMap;

/// Grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 3, cols: 5 }
    }
}

/// What pressing a button does.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonAction {
    /// Operation id (`switch_scene`, `toggle_stream`, ...).
    #[serde(rename = "type")]
    pub operation: String,
    /// Operation parameters.
    #[serde(default)]
    pub params: PropertyMap,
}

/// One button in the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Button id, unique within the config.
    pub id: String,
    /// Zero-based row.
    pub row: u32,
    /// Zero-based column.
    pub col: u32,
    /// Label.
    pub text: String,
    /// Background color.
    pub color: String,
    /// Optional icon path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Bound action.
    pub action: ButtonAction,
}

/// Full layout: grid size plus buttons.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Grid size.
    pub grid: GridConfig,
    /// Buttons, in display order.
    #[serde(default)]
    pub buttons: Vec<Button>,
}

impl ButtonConfig {
    /// Find a button by id.
    pub fn get_button(&self, id: &str) -> Option<&Button> {
        self.buttons.iter().find(|b| b.id == id)
    }

    /// Replace the button with the same id, or append it.
    pub fn update_button(&mut self, button: Button) {
        match self.buttons.iter_mut().find(|b| b.id == button.id) {
            Some(existing) => *existing = button,
            None => self.buttons.push(button),
        }
    }

    /// Remove a button by id. Returns the removed button, if any.
    pub fn delete_button(&mut self, id: &str) -> Option<Button> {
        let index = self.buttons.iter().position(|b| b.id == id)?;
        Some(self.buttons.remove(index))
    }
}
