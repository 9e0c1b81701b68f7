//! Feed shape detection and record extraction.

use crate::node::FeedNode;
use catalog_core::ProductRecord;

/// A known location of the item list inside a feed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatcher {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

impl ShapeMatcher {
    /// Items at this shape's path, or `None` if the document has another shape.
    pub fn locate<'a>(&self, doc: &'a FeedNode) -> Option<&'a FeedNode> {
        doc.at_path(self.path)
    }
}

/// Shapes tried in priority order; the first one present wins.
pub const KNOWN_SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "rss",
        path: &["rss", "channel", "item"],
    },
    ShapeMatcher {
        name: "root/product",
        path: &["root", "product"],
    },
    ShapeMatcher {
        name: "products/product",
        path: &["products", "product"],
    },
    ShapeMatcher {
        name: "atom",
        path: &["feed", "entry"],
    },
];

/// The first known shape present in `doc`, with the node found at its path.
pub fn matched_shape(doc: &FeedNode) -> Option<(&'static ShapeMatcher, &FeedNode)> {
    KNOWN_SHAPES
        .iter()
        .find_map(|shape| shape.locate(doc).map(|items| (shape, items)))
}

/// Extract product records from a feed document, in feed order.
///
/// Never fails: a document matching none of the known shapes yields an
/// empty vector.
pub fn extract(doc: &FeedNode) -> Vec<ProductRecord> {
    let Some((shape, items)) = matched_shape(doc) else {
        tracing::debug!("Feed matches no known shape");
        return Vec::new();
    };

    let records: Vec<ProductRecord> = items.as_items().iter().map(FeedNode::to_record).collect();
    tracing::info!("Extracted {} products ({} shape)", records.len(), shape.name);
    records
}
