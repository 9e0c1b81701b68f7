//! One fetch → normalize → store cycle
//!
//! A cycle never returns an error: every failure is logged and reported as a
//! [`CycleOutcome`], and the next cycle starts from scratch. A feed that
//! yields no records skips the store entirely, so a temporarily malformed
//! feed cannot zero out the previously stored catalog.

use crate::sync::ProductSynchronizer;
use catalog_core::SyncResult;
use feed_source::{extract, matched_shape, FeedSource};
use kv_store::KvStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

/// Whether a cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Records and metadata were written
    Synced(SyncResult),
    /// The feed held no recognizable items; the store was not touched
    NoRecords,
    /// The feed could not be fetched or parsed; the store was not touched
    FetchFailed(String),
    /// A store write failed part way; earlier batches remain written
    StoreFailed(String),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Synced(_))
    }
}

/// Counts one cycle as in flight until dropped.
struct RunningGuard<'a>(&'a AtomicUsize);

impl<'a> RunningGuard<'a> {
    fn enter(running: &'a AtomicUsize) -> Self {
        running.fetch_add(1, Ordering::SeqCst);
        Self(running)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs the feed-to-store pipeline.
///
/// Overlapping calls to [`SyncCycle::run_cycle`] are not prevented here; the
/// trigger (see [`crate::Scheduler`]) must wait for one cycle to finish before
/// starting the next. If calls do overlap, [`SyncCycle::state`] stays
/// `Running` until the last of them returns.
pub struct SyncCycle<F, S> {
    source: F,
    synchronizer: ProductSynchronizer<S>,
    running: AtomicUsize,
}

impl<F: FeedSource, S: KvStore> SyncCycle<F, S> {
    pub fn new(source: F, synchronizer: ProductSynchronizer<S>) -> Self {
        Self {
            source,
            synchronizer,
            running: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn synchronizer(&self) -> &ProductSynchronizer<S> {
        &self.synchronizer
    }

    pub fn state(&self) -> CycleState {
        if self.running.load(Ordering::SeqCst) > 0 {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let _running = RunningGuard::enter(&self.running);
        info!("Starting sync cycle for {}", self.source.describe());

        let document = match self.source.fetch().await {
            Ok(document) => document,
            Err(e) => {
                let e = anyhow::Error::new(e);
                error!("Error fetching feed: {e:#}");
                return CycleOutcome::FetchFailed(format!("{e:#}"));
            }
        };

        if let Some((shape, _)) = matched_shape(&document) {
            debug!("Feed matches {} shape", shape.name);
        }
        let records = extract(&document);
        drop(document);

        if records.is_empty() {
            warn!("No products found in feed. Check the feed structure.");
            return CycleOutcome::NoRecords;
        }

        match self.synchronizer.sync(records).await {
            Ok(result) => {
                info!(
                    "Sync completed successfully: {} products saved at {}",
                    result.count, result.timestamp
                );
                CycleOutcome::Synced(result)
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                error!("Error saving products to store: {e:#}");
                CycleOutcome::StoreFailed(format!("{e:#}"))
            }
        }
    }
}
