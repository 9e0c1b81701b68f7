//! Command-line interface for catalog-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Sync now, then every 12 hours until Ctrl+C
//! catalog-sync run \
//!   --feed-url https://example.com/export/products.xml \
//!   --store-url https://eu1-example.upstash.io --store-token "$TOKEN"
//!
//! # Single cycle against a local Redis, every 30 minutes
//! catalog-sync run --store-url redis://localhost:6379 --interval 30m
//!
//! # Try a feed without touching any store
//! catalog-sync once --dry-run
//!
//! # Inspect what is stored
//! catalog-sync status
//! catalog-sync list > products.jsonl
//! ```
//!
//! Every option can also be set through the environment (see `--help`); a
//! `.env` file in the working directory is loaded first.

use anyhow::Context;
use catalog_sync::{
    config::parse_duration, connect_store, FeedOpts, ProductSynchronizer, Scheduler, StoreOpts,
    SyncCycle,
};
use clap::{Parser, Subcommand};
use feed_source::HttpFeedSource;
use kv_store::KvStore;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Mirror an XML product feed into a key-value store")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync immediately, then on a fixed interval until interrupted
    Run {
        #[command(flatten)]
        feed: FeedOpts,

        #[command(flatten)]
        store: StoreOpts,

        /// Time between cycles (e.g. "30m", "12h", "1d")
        #[arg(long, default_value = "12h", env = "SYNC_INTERVAL")]
        interval: String,
    },
    /// Run a single sync cycle
    Once {
        #[command(flatten)]
        feed: FeedOpts,

        #[command(flatten)]
        store: StoreOpts,
    },
    /// Show the metadata of the last sync
    Status {
        #[command(flatten)]
        store: StoreOpts,
    },
    /// Print every stored product as a JSON line
    List {
        #[command(flatten)]
        store: StoreOpts,
    },
    /// Delete all stored products and sync metadata
    Clear {
        #[command(flatten)]
        store: StoreOpts,

        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            feed,
            store,
            interval,
        } => {
            let interval = parse_duration(&interval)
                .with_context(|| format!("Invalid sync interval: {interval}"))?;
            let scheduler = Scheduler::new(interval)?;
            let cycle = build_cycle(&feed, &store).await?;

            print_startup_status(&cycle, &scheduler).await;

            let cycles = scheduler.run(&cycle, shutdown_signal()).await;
            info!("Scheduler stopped after {cycles} cycles");
        }
        Commands::Once { feed, store } => {
            let cycle = build_cycle(&feed, &store).await?;
            let outcome = cycle.run_cycle().await;
            info!("Cycle finished: {outcome:?}");
        }
        Commands::Status { store } => {
            let synchronizer = build_synchronizer(&store).await?;
            let metadata = synchronizer
                .get_metadata()
                .await
                .context("Failed to read sync metadata")?;
            println!(
                "Last update: {}",
                metadata.last_update.as_deref().unwrap_or("never")
            );
            println!(
                "Products count: {}",
                metadata.count.map_or_else(|| "0".to_string(), |c| c.to_string())
            );
        }
        Commands::List { store } => {
            let synchronizer = build_synchronizer(&store).await?;
            let records = synchronizer
                .list_all()
                .await
                .context("Failed to read stored products")?;
            for persisted in &records {
                let line = serde_json::json!({
                    "id": persisted.id,
                    "product": persisted.record,
                });
                println!("{line}");
            }
            info!("Listed {} products", records.len());
        }
        Commands::Clear { store, yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all products without --yes");
            }
            let synchronizer = build_synchronizer(&store).await?;
            let cleared = synchronizer
                .clear_all()
                .await
                .context("Failed to clear stored products")?;
            println!("Cleared {cleared} products");
        }
    }

    Ok(())
}

async fn build_synchronizer(
    opts: &StoreOpts,
) -> anyhow::Result<ProductSynchronizer<Box<dyn KvStore>>> {
    let store = connect_store(opts).await?;
    Ok(ProductSynchronizer::new(store).with_batch_size(opts.batch_size))
}

async fn build_cycle(
    feed: &FeedOpts,
    store: &StoreOpts,
) -> anyhow::Result<SyncCycle<HttpFeedSource, Box<dyn KvStore>>> {
    let source = HttpFeedSource::new(feed.feed_url.clone(), feed.fetch_options()?)
        .context("Failed to build feed client")?;
    let synchronizer = build_synchronizer(store).await?;
    Ok(SyncCycle::new(source, synchronizer))
}

async fn print_startup_status(
    cycle: &SyncCycle<HttpFeedSource, Box<dyn KvStore>>,
    scheduler: &Scheduler,
) {
    info!("Sync scheduled every {}", describe_interval(scheduler.interval()));
    info!("Feed URL: {}", cycle.source().url());
    match cycle.synchronizer().get_metadata().await {
        Ok(metadata) if metadata.is_empty() => info!("No previous sync found"),
        Ok(metadata) => info!(
            "Last update: {}, products: {}",
            metadata.last_update.as_deref().unwrap_or("unknown"),
            metadata.count.unwrap_or(0)
        ),
        Err(e) => warn!("Could not read sync metadata: {e}"),
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        s if s >= 3600 && s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{s} seconds"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received interrupt signal (Ctrl+C)");
}
