use crate::StoreOpts;
use anyhow::Context;
use kv_store::{KvStore, MemoryStore, RedisStore, RestStore};

/// Store backend selected by endpoint scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Rest,
    Redis,
}

impl StoreBackend {
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .with_context(|| format!("Store endpoint has no scheme: {url}"))?;
        match scheme.as_str() {
            "memory" => Ok(Self::Memory),
            "http" | "https" => Ok(Self::Rest),
            "redis" | "rediss" => Ok(Self::Redis),
            other => anyhow::bail!("Unsupported store scheme '{other}' in {url}"),
        }
    }
}

// Connect to the configured key-value store
pub async fn connect_store(opts: &StoreOpts) -> anyhow::Result<Box<dyn KvStore>> {
    if opts.dry_run {
        tracing::warn!("Running in dry-run mode - writes go to an in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }

    let url = opts
        .store_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .context("Store endpoint is required (--store-url or UPSTASH_REDIS_REST_URL)")?;
    let token = opts.store_token.as_deref();

    let store: Box<dyn KvStore> = match StoreBackend::from_url(url)? {
        StoreBackend::Memory => Box::new(MemoryStore::new()),
        StoreBackend::Rest => {
            let token = token.context(
                "REST store requires a token (--store-token or UPSTASH_REDIS_REST_TOKEN)",
            )?;
            Box::new(RestStore::new(url, token)?)
        }
        StoreBackend::Redis => Box::new(
            RedisStore::connect(url, token)
                .await
                .with_context(|| format!("Failed to connect to {url}"))?,
        ),
    };
    tracing::info!("Connected to key-value store");
    Ok(store)
}
