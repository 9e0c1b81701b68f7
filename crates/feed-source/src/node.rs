//! Generic feed document tree.

use catalog_core::{FieldValue, ProductRecord, TEXT_KEY};
use std::collections::BTreeMap;

/// A node of a parsed feed document.
///
/// The document itself is a [`FeedNode::Map`] with a single entry keyed by the
/// root element name.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedNode {
    /// Element with text only (no attributes, no children)
    Text(String),
    /// Element with attributes and/or child elements
    Map(BTreeMap<String, FeedNode>),
    /// Repeated sibling elements, in document order
    List(Vec<FeedNode>),
}

impl FeedNode {
    pub fn as_map(&self) -> Option<&BTreeMap<String, FeedNode>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Child of a map node.
    pub fn get(&self, key: &str) -> Option<&FeedNode> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow a path of map keys.
    pub fn at_path(&self, path: &[&str]) -> Option<&FeedNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// View this node as a sequence: lists as-is, anything else as one element.
    pub fn as_items(&self) -> &[FeedNode] {
        match self {
            Self::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Convert one feed item into a record.
    ///
    /// A text-only item yields a record holding the text under `_`.
    pub fn to_record(&self) -> ProductRecord {
        match self {
            Self::Map(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.to_field_value()))
                .collect(),
            other => {
                let mut record = ProductRecord::new();
                record.insert(TEXT_KEY, other.to_field_value());
                record
            }
        }
    }

    pub fn to_field_value(&self) -> FieldValue {
        match self {
            Self::Text(s) => FieldValue::Text(s.clone()),
            Self::List(items) => FieldValue::List(items.iter().map(Self::to_field_value).collect()),
            Self::Map(map) => FieldValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_field_value()))
                    .collect(),
            ),
        }
    }
}
