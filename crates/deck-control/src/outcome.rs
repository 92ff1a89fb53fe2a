//! Result of a dispatched action.

use deck_core::messages::SuccessPayload;
use deck_core::{PropertyMap, PropertyValue};

/// What a successful action did, ready for a `SUCCESS` payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionOutcome {
    /// Human-readable summary.
    pub message: String,
    /// Values the operation produced (new toggle state, output path, ...).
    pub data: PropertyMap,
}

impl ActionOutcome {
    /// Outcome with no data.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: PropertyMap::new(),
        }
    }

    /// Attach one data value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let _ = self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a data value.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }
}

impl From<ActionOutcome> for SuccessPayload {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            message: outcome.message,
            data: (!outcome.data.is_empty()).then_some(outcome.data),
        }
    }
}
