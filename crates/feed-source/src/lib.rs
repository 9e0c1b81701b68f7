//! Feed retrieval and normalization for catalog-sync
//!
//! This crate turns a remote XML product feed into an ordered list of
//! [`ProductRecord`]s:
//!
//! 1. [`HttpFeedSource`] fetches the feed over HTTP(S) with a timeout and a
//!    browser-like `User-Agent`
//! 2. [`parse_document`] converts the markup into a [`FeedNode`] tree
//! 3. [`extract`] locates the item list among the known feed shapes
//!
//! # Example
//!
//! ```ignore
//! use feed_source::{extract, FeedSource, FetchOptions, HttpFeedSource};
//!
//! let source = HttpFeedSource::new("https://example.com/products.xml", FetchOptions::default())?;
//! let doc = source.fetch().await?;
//! let records = extract(&doc);
//! ```

mod error;
mod http;
mod node;
mod normalize;
mod xml;

use async_trait::async_trait;

pub use catalog_core::ProductRecord;
pub use error::FetchError;
pub use http::{FetchOptions, HttpFeedSource, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
pub use node::FeedNode;
pub use normalize::{extract, matched_shape, ShapeMatcher, KNOWN_SHAPES};
pub use xml::parse_document;

/// A place a feed document can be fetched from.
///
/// The orchestrator depends on this trait only, so cycles can be driven by
/// something other than a live HTTP endpoint.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the current feed document.
    async fn fetch(&self) -> Result<FeedNode, FetchError>;

    /// Human-readable location of the feed, for logs.
    fn describe(&self) -> String;
}
