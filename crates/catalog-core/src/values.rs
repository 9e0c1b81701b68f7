//! Field values of product records.
//!
//! Feeds do not share a schema, so every field is held as a [`FieldValue`]
//! and callers check for presence and shape before using it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which an element's own text is stored when the element also
/// carries attributes or child elements.
pub const TEXT_KEY: &str = "_";

/// Value of a single record field.
///
/// Serialized without tags, so a record encodes as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// String value
    Text(String),

    /// Ordered list of values (repeated elements)
    List(Vec<FieldValue>),

    /// Nested map of values (element with attributes or children)
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text content of this value.
    ///
    /// For a map this is the element text stored under [`TEXT_KEY`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Map(map) => map.get(TEXT_KEY).and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// Render this value as a record identifier, if it can serve as one.
    ///
    /// Empty text, null, booleans, lists and maps without text do not qualify.
    pub fn as_identifier(&self) -> Option<String> {
        match self {
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) if f.is_finite() => Some(f.to_string()),
            Self::Text(_) | Self::Map(_) => self
                .text()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
