//! Product records and their persisted form.

use crate::keys::product_key;
use crate::values::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields consulted, in order, for a feed-provided identifier.
pub const ID_FIELDS: [&str; 3] = ["g:id", "id", "code"];

/// Fields that are only meaningful to the feed and are never persisted.
pub const DISALLOWED_FIELDS: [&str; 4] = [
    "g:id",
    "g:gtin",
    "g:shipping",
    "g:free_shipping_threshold",
];

/// Field stamped with the sync timestamp on every persisted record.
pub const LAST_UPDATED_FIELD: &str = "last_updated";

/// Prefix of identifiers synthesized for records without an id or code.
pub const SYNTHETIC_ID_PREFIX: &str = "product_";

/// One catalog item as given by the feed.
///
/// No field is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl ProductRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Text of a field, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::text)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Identifier of this record when it sits at `index` in the full feed.
    ///
    /// The first usable value among [`ID_FIELDS`] wins; otherwise the
    /// identifier is synthesized from the absolute index, so two records
    /// without ids never share one within a cycle.
    pub fn identifier(&self, index: usize) -> String {
        ID_FIELDS
            .iter()
            .find_map(|field| self.get(field).and_then(FieldValue::as_identifier))
            .unwrap_or_else(|| format!("{SYNTHETIC_ID_PREFIX}{index}"))
    }

    /// Strip disallowed fields and stamp the sync timestamp.
    pub fn into_persisted(mut self, id: String, timestamp: &str) -> PersistedRecord {
        for field in DISALLOWED_FIELDS {
            self.fields.remove(field);
        }
        self.insert(LAST_UPDATED_FIELD, timestamp);
        PersistedRecord { id, record: self }
    }
}

impl FromIterator<(String, FieldValue)> for ProductRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, FieldValue>> for ProductRecord {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

/// A record as it lives in the store under `product:<id>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub id: String,
    pub record: ProductRecord,
}

impl PersistedRecord {
    pub fn key(&self) -> String {
        product_key(&self.id)
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.record.text(LAST_UPDATED_FIELD)
    }

    /// Encode the record body as stored (the identifier lives in the key).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.record)
    }

    /// Decode a stored record body.
    pub fn from_json(id: impl Into<String>, json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            id: id.into(),
            record: serde_json::from_str(json)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> ProductRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_identifier_priority() {
        let r = record(&[("g:id", "G1"), ("id", "I1"), ("code", "C1")]);
        assert_eq!(r.identifier(0), "G1");

        let r = record(&[("id", "I1"), ("code", "C1")]);
        assert_eq!(r.identifier(0), "I1");

        let r = record(&[("code", "C1")]);
        assert_eq!(r.identifier(0), "C1");
    }

    #[test]
    fn test_identifier_skips_empty_values() {
        let r = record(&[("g:id", ""), ("id", ""), ("code", "C9")]);
        assert_eq!(r.identifier(4), "C9");
    }

    #[test]
    fn test_identifier_fallback_uses_absolute_index() {
        let r = record(&[("title", "Soap")]);
        assert_eq!(r.identifier(0), "product_0");
        assert_eq!(r.identifier(137), "product_137");
        assert_ne!(r.identifier(5), r.identifier(105));
    }

    #[test]
    fn test_into_persisted_strips_and_stamps() {
        let r = record(&[
            ("g:id", "G1"),
            ("g:gtin", "123"),
            ("g:shipping", "x"),
            ("g:free_shipping_threshold", "50"),
            ("title", "Soap"),
        ]);
        let id = r.identifier(0);
        let persisted = r.into_persisted(id, "2024-05-01T12:00:00.000Z");

        assert_eq!(persisted.id, "G1");
        assert_eq!(persisted.key(), "product:G1");
        for field in DISALLOWED_FIELDS {
            assert!(!persisted.record.contains(field), "{field} persisted");
        }
        assert_eq!(persisted.record.text("title"), Some("Soap"));
        assert_eq!(persisted.last_updated(), Some("2024-05-01T12:00:00.000Z"));
    }

    #[test]
    fn test_last_updated_overrides_feed_value() {
        let r = record(&[("last_updated", "yesterday")]);
        let persisted = r.into_persisted("a".into(), "2024-05-01T12:00:00.000Z");
        assert_eq!(persisted.last_updated(), Some("2024-05-01T12:00:00.000Z"));
    }

    #[test]
    fn test_json_body_is_plain_object() {
        let persisted = record(&[("title", "Soap")]).into_persisted("7".into(), "t");
        let json = persisted.to_json().unwrap();
        assert_eq!(json, r#"{"last_updated":"t","title":"Soap"}"#);

        let decoded = PersistedRecord::from_json("7", &json).unwrap();
        assert_eq!(decoded, persisted);
    }
}
