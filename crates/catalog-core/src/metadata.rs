//! Sync bookkeeping types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a completed store sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Number of records written
    pub count: usize,
    /// Timestamp stamped on every record of the cycle
    pub timestamp: String,
    /// Number of write batches issued
    pub batches: usize,
}

/// Metadata entries written at the start of every sync.
///
/// Both fields are `None` when the store has never been synced (or was cleared).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub last_update: Option<String>,
    pub count: Option<u64>,
}

impl SyncMetadata {
    pub fn is_empty(&self) -> bool {
        self.last_update.is_none() && self.count.is_none()
    }
}

/// Format a timestamp the way every stored timestamp is written:
/// UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
