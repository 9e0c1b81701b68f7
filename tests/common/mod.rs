//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use feed_source::{parse_document, FeedNode, FeedSource, FetchError};
use kv_store::{KvStore, MemoryStore, Result, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// `MemoryStore` wrapper that counts calls, tracks how many are in flight at
/// once and can be told to fail writes to one key.
#[derive(Default)]
pub struct TrackingStore {
    pub inner: MemoryStore,
    calls: AtomicUsize,
    writes: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_key: Mutex<Option<String>>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `SET` of `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        *self.fail_key.lock().unwrap() = Some(key.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Count the call and hold it open across a yield so concurrent calls
    /// overlap.
    async fn enter(&self) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        InFlight(&self.in_flight)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KvStore for TrackingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.enter().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.enter().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(StoreError::backend("SET", "injected failure"));
        }
        self.inner.set(key, value).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let _guard = self.enter().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.del(key).await
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        let _guard = self.enter().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.sadd(set, member).await
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        let _guard = self.enter().await;
        self.inner.smembers(set).await
    }
}

/// Feed source serving a fixed document.
pub struct StaticFeed(pub String);

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> std::result::Result<FeedNode, FetchError> {
        parse_document(&self.0)
    }

    fn describe(&self) -> String {
        "static feed".to_string()
    }
}

/// Feed source that always fails with an HTTP status error.
pub struct FailingFeed;

#[async_trait]
impl FeedSource for FailingFeed {
    async fn fetch(&self) -> std::result::Result<FeedNode, FetchError> {
        Err(FetchError::Status {
            url: "http://feed.invalid/products.xml".to_string(),
            status: 503,
        })
    }

    fn describe(&self) -> String {
        "failing feed".to_string()
    }
}

/// A `products/product` feed with `count` items whose ids are `0..count`.
pub fn products_feed(count: usize) -> String {
    let mut xml = String::from("<products>");
    for i in 0..count {
        xml.push_str(&format!(
            "<product><id>{i}</id><title>Product {i}</title><price>{i}.99</price></product>"
        ));
    }
    xml.push_str("</products>");
    xml
}
