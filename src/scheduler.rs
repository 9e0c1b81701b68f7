use crate::cycle::{CycleOutcome, SyncCycle};
use feed_source::FeedSource;
use kv_store::KvStore;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Fixed-interval trigger for sync cycles.
///
/// The first cycle runs as soon as [`Scheduler::run`] is called. Each cycle is
/// awaited before the next tick is taken, so a cycle that outlasts the interval
/// delays the following one instead of overlapping it.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> anyhow::Result<Self> {
        if interval.is_zero() {
            anyhow::bail!("Sync interval must be greater than zero");
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` resolves and return how many were run.
    ///
    /// Shutdown is only observed between cycles; a cycle in flight runs to
    /// completion.
    pub async fn run<F, S>(
        &self,
        cycle: &SyncCycle<F, S>,
        shutdown: impl Future<Output = ()>,
    ) -> usize
    where
        F: FeedSource,
        S: KvStore,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Received shutdown signal, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    cycles += 1;
                    debug!("Scheduled cycle {cycles} triggered");
                    match cycle.run_cycle().await {
                        CycleOutcome::Synced(_) => {}
                        CycleOutcome::NoRecords => warn!("Cycle {cycles} found no products"),
                        CycleOutcome::FetchFailed(_) | CycleOutcome::StoreFailed(_) => {
                            warn!("Cycle {cycles} failed; retrying at the next interval")
                        }
                    }
                }
            }
        }
        cycles
    }
}
