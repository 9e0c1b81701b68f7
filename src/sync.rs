//! Store synchronization of normalized feed records
//!
//! A sync writes the metadata entries first, then every record in
//! fixed-size batches: all writes of a batch are issued together and awaited
//! before the next batch starts, so at most `batch_size` writes are ever in
//! flight. The first failed write aborts the rest of its batch and the sync;
//! batches already written stay in the store.
//!
//! Identifiers of records that drop out of the feed are never removed from
//! `products:all_ids`, and their `product:<id>` keys keep their last value.

use catalog_core::{
    format_timestamp, product_key, PersistedRecord, ProductRecord, SyncMetadata, SyncResult,
    ALL_IDS_KEY, COUNT_KEY, LAST_UPDATE_KEY,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use kv_store::{KvStore, Result, StoreError};
use tracing::{debug, info, warn};

/// Records written concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Writes product records and sync metadata into a key-value store.
pub struct ProductSynchronizer<S> {
    store: S,
    batch_size: usize,
}

impl<S: KvStore> ProductSynchronizer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `records`, stamped with the current time.
    pub async fn sync(&self, records: Vec<ProductRecord>) -> Result<SyncResult> {
        self.sync_at(records, Utc::now()).await
    }

    /// Persist `records`, stamped with `at`.
    pub async fn sync_at(&self, records: Vec<ProductRecord>, at: DateTime<Utc>) -> Result<SyncResult> {
        let timestamp = format_timestamp(at);
        let total = records.len();
        info!("Saving {total} products to store...");

        self.store.set(LAST_UPDATE_KEY, &timestamp).await?;
        self.store.set(COUNT_KEY, &total.to_string()).await?;

        let mut pending = records.into_iter().enumerate().peekable();
        let mut saved = 0;
        let mut batches = 0;
        while pending.peek().is_some() {
            let batch: Vec<(usize, ProductRecord)> =
                pending.by_ref().take(self.batch_size).collect();
            let writes = batch
                .into_iter()
                .map(|(index, record)| self.write_record(index, record, &timestamp));
            saved += try_join_all(writes).await?.len();
            batches += 1;
            info!("Saved {saved}/{total} products");
        }

        info!("All products saved successfully to store");
        Ok(SyncResult {
            count: total,
            timestamp,
            batches,
        })
    }

    /// Write one record at absolute position `index`; returns its identifier.
    async fn write_record(&self, index: usize, record: ProductRecord, timestamp: &str) -> Result<String> {
        let id = record.identifier(index);
        let persisted = record.into_persisted(id, timestamp);
        let body = persisted
            .to_json()
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        self.store.set(&persisted.key(), &body).await?;
        self.store.sadd(ALL_IDS_KEY, &persisted.id).await?;
        Ok(persisted.id)
    }

    /// Read every indexed record, sorted by identifier.
    ///
    /// An identifier whose record key is gone is skipped; any failed read or
    /// undecodable body fails the whole call.
    pub async fn list_all(&self) -> Result<Vec<PersistedRecord>> {
        let mut ids = self.store.smembers(ALL_IDS_KEY).await?;
        ids.sort();

        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.batch_size) {
            let reads = chunk.iter().map(|id| self.read_record(id));
            records.extend(try_join_all(reads).await?.into_iter().flatten());
        }
        debug!("Read {} of {} indexed products", records.len(), ids.len());
        Ok(records)
    }

    async fn read_record(&self, id: &str) -> Result<Option<PersistedRecord>> {
        let key = product_key(id);
        match self.store.get(&key).await? {
            Some(body) => PersistedRecord::from_json(id, &body)
                .map(Some)
                .map_err(|e| StoreError::decode(key, e)),
            None => {
                warn!("Indexed product {id} has no value at {key}");
                Ok(None)
            }
        }
    }

    /// Metadata of the last sync.
    pub async fn get_metadata(&self) -> Result<SyncMetadata> {
        let last_update = self.store.get(LAST_UPDATE_KEY).await?;
        let count = match self.store.get(COUNT_KEY).await? {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| StoreError::decode(COUNT_KEY, e))?,
            ),
            None => None,
        };
        Ok(SyncMetadata { last_update, count })
    }

    /// Delete every indexed record, the identifier set and the metadata.
    ///
    /// Returns the number of identifiers that were indexed.
    pub async fn clear_all(&self) -> Result<usize> {
        let ids = self.store.smembers(ALL_IDS_KEY).await?;

        for chunk in ids.chunks(self.batch_size) {
            let deletes = chunk
                .iter()
                .map(|id| async move { self.store.del(&product_key(id)).await });
            try_join_all(deletes).await?;
        }

        self.store.del(ALL_IDS_KEY).await?;
        self.store.del(LAST_UPDATE_KEY).await?;
        self.store.del(COUNT_KEY).await?;

        info!("All {} products cleared from store", ids.len());
        Ok(ids.len())
    }
}
