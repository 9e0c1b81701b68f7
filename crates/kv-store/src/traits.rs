//! KvStore trait definition.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for the remote key-value store records are persisted into.
///
/// Mirrors the handful of commands the synchronizer needs. Operations are
/// independent: there is no transaction spanning several calls, and
/// timeouts are whatever the backend's client enforces.
///
/// # Usage Pattern
///
/// Callers take the store as a generic parameter:
///
/// ```ignore
/// pub async fn write<S: KvStore>(store: &S) -> Result<()> {
///     store.set("product:1", "{}").await?;
///     store.sadd("products:all_ids", "1").await?;
///     Ok(())
/// }
/// ```
///
/// A backend chosen at runtime is passed as `Box<dyn KvStore>`, which also
/// implements the trait.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `GET key`. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `SET key value`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// `DEL key`. Returns whether the key existed.
    async fn del(&self, key: &str) -> Result<bool>;

    /// `SADD set member`. Returns whether the member was newly added.
    async fn sadd(&self, set: &str, member: &str) -> Result<bool>;

    /// `SMEMBERS set`. A missing set is empty.
    async fn smembers(&self, set: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Box<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        (**self).del(key).await
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        (**self).sadd(set, member).await
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        (**self).smembers(set).await
    }
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        (**self).del(key).await
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        (**self).sadd(set, member).await
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        (**self).smembers(set).await
    }
}
