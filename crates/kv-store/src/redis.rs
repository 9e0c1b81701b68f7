//! Native Redis protocol backend.

use crate::error::{Result, StoreError};
use crate::traits::KvStore;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};

/// Store speaking RESP to a Redis-compatible server.
///
/// Uses a connection manager, so a dropped connection is re-established on
/// the next command instead of failing every later cycle.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to `url` (`redis://` or `rediss://`).
    ///
    /// A non-empty `password` replaces any password embedded in the URL.
    #[tracing::instrument(level = "debug", skip(password))]
    pub async fn connect(url: &str, password: Option<&str>) -> Result<Self> {
        let mut info = url
            .into_connection_info()
            .map_err(|e| StoreError::Config(format!("invalid redis url: {e}")))?;
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            info.redis.password = Some(password.to_string());
        }

        let client = redis::Client::open(info).map_err(|e| StoreError::backend("open", e))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::backend("connect", e))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::backend("GET", e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| StoreError::backend("SET", e))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let n: i64 = conn
            .del(key)
            .await
            .map_err(|e| StoreError::backend("DEL", e))?;
        Ok(n > 0)
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let n: i64 = conn
            .sadd(set, member)
            .await
            .map_err(|e| StoreError::backend("SADD", e))?;
        Ok(n > 0)
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let members: Vec<String> = conn
            .smembers(set)
            .await
            .map_err(|e| StoreError::backend("SMEMBERS", e))?;
        Ok(members)
    }
}
