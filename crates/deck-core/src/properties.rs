//! Typed property values for schema-less maps.
//!
//! Action properties and OBS input settings are free-form JSON objects. They
//! are carried as a [`PropertyMap`] of [`PropertyValue`]s so callers match on
//! value kinds instead of poking at an untyped blob, while the JSON shape on
//! the wire stays exactly what the peer sent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String-keyed map of property values.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single property value.
///
/// Serialized untagged: `PropertyValue::Bool(true)` is plain `true` in JSON.
/// Integers and floats are kept apart so integer settings (widths, device
/// indices) are written back to the peer as integers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// JSON `null`.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Non-integral (or out of `i64` range) number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list.
    List(Vec<PropertyValue>),
    /// Nested map.
    Map(PropertyMap),
}

impl PropertyValue {
    /// Borrow as a string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as a boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as a float. Integers widen losslessly for the ranges OBS uses.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Read as an integer. Floats with no fractional part are accepted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Borrow as a nested map, if this is a map.
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{}", Value::from(other.clone())),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(b),
            PropertyValue::Integer(i) => Value::from(i),
            // NaN and infinities have no JSON form
            PropertyValue::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
            PropertyValue::String(s) => Value::String(s),
            PropertyValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PropertyValue::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Convert a JSON object into a [`PropertyMap`].
///
/// Returns `None` when `value` is not an object.
pub fn map_from_json(value: Value) -> Option<PropertyMap> {
    match PropertyValue::from(value) {
        PropertyValue::Map(map) => Some(map),
        _ => None,
    }
}

/// Convert a [`PropertyMap`] into a JSON object.
pub fn map_to_json(map: PropertyMap) -> Value {
    Value::from(PropertyValue::Map(map))
}
