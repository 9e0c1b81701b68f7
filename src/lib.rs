//! catalog-sync library
//!
//! Periodically mirrors a product catalog published as an XML feed into a
//! key-value store. Each cycle re-fetches the whole feed and overwrites the
//! stored state; nothing is diffed against the previous cycle.
//!
//! # Pipeline
//!
//! ```text
//! FeedSource::fetch ──> extract ──> ProductSynchronizer::sync ──> KvStore
//!   (feed-source)      (feed-source)      (this crate)            (kv-store)
//! ```
//!
//! [`SyncCycle`] runs the pipeline once and never fails; [`Scheduler`] runs
//! cycles on a fixed interval, one at a time.
//!
//! # Stored Keys
//!
//! - `product:<id>` - JSON body of one product
//! - `products:all_ids` - set of every identifier written
//! - `products:last_update` - timestamp of the last sync
//! - `products:count` - record count of the last sync

use clap::Parser;

pub mod config;
pub mod connect;
pub mod cycle;
pub mod scheduler;
pub mod sync;

pub use connect::{connect_store, StoreBackend};
pub use cycle::{CycleOutcome, CycleState, SyncCycle};
pub use scheduler::Scheduler;
pub use sync::{ProductSynchronizer, DEFAULT_BATCH_SIZE};

/// Feed fetched when no URL is configured.
pub const DEFAULT_FEED_URL: &str = "https://www.drogeriadomov.sk/export/products.xml";

#[derive(Parser, Clone, Debug)]
pub struct FeedOpts {
    /// URL of the XML product feed
    #[arg(long, default_value = DEFAULT_FEED_URL, env = "FEED_URL")]
    pub feed_url: String,

    /// Timeout of a whole feed request (e.g. "30s")
    #[arg(long, default_value = "30s", env = "FEED_FETCH_TIMEOUT")]
    pub fetch_timeout: String,

    /// User-Agent header sent with feed requests
    #[arg(long, default_value = feed_source::DEFAULT_USER_AGENT, env = "FEED_USER_AGENT")]
    pub user_agent: String,
}

impl FeedOpts {
    pub fn fetch_options(&self) -> anyhow::Result<feed_source::FetchOptions> {
        let timeout = config::parse_duration(&self.fetch_timeout)?;
        if timeout.is_zero() {
            anyhow::bail!("Fetch timeout must be greater than zero");
        }
        Ok(feed_source::FetchOptions {
            timeout,
            user_agent: self.user_agent.clone(),
        })
    }
}

#[derive(Parser, Clone)]
pub struct StoreOpts {
    /// Key-value store endpoint (https:// REST, redis:// or rediss://, memory://)
    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    pub store_url: Option<String>,

    /// Key-value store credential (REST token or Redis password)
    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    /// Number of records written concurrently per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Dry run mode - write to an in-memory store instead
    #[arg(long)]
    pub dry_run: bool,
}
