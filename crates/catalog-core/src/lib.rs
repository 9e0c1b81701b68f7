//! Core record types for catalog-sync.
//!
//! This crate provides the data model shared by the feed source, the
//! key-value store backends and the synchronizer:
//!
//! - [`FieldValue`] - Tagged scalar-or-structured value of a record field
//! - [`ProductRecord`] - One catalog item as given by the feed
//! - [`PersistedRecord`] - A record prepared for (or read back from) the store
//! - [`SyncMetadata`] / [`SyncResult`] - Bookkeeping written alongside records
//!
//! # Architecture
//!
//! ```text
//! catalog-core (this crate)
//!    │
//!    ├─── feed-source   (builds ProductRecords from the feed tree)
//!    ├─── kv-store      (string keys and values only)
//!    └─── catalog-sync  (derives identifiers, writes PersistedRecords)
//! ```

pub mod keys;
pub mod metadata;
pub mod record;
pub mod values;

// Re-exports for convenience
pub use keys::{product_key, ALL_IDS_KEY, COUNT_KEY, LAST_UPDATE_KEY, PRODUCT_KEY_PREFIX};
pub use metadata::{format_timestamp, SyncMetadata, SyncResult};
pub use record::{
    PersistedRecord, ProductRecord, DISALLOWED_FIELDS, ID_FIELDS, LAST_UPDATED_FIELD,
    SYNTHETIC_ID_PREFIX,
};
pub use values::{FieldValue, TEXT_KEY};
