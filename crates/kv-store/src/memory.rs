//! In-process store backend.

use crate::error::{Result, StoreError};
use crate::traits::KvStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct State {
    values: BTreeMap<String, String>,
    sets: BTreeMap<String, BTreeSet<String>>,
}

/// Store that keeps everything in process memory.
///
/// Strings and sets share one keyspace, as in Redis: `DEL` removes either.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| StoreError::backend("lock", e))
    }

    /// All existing keys (string and set), sorted.
    ///
    /// Reads through a poisoned lock: every write leaves the maps consistent.
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .values
            .keys()
            .chain(state.sets.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.sets.remove(key);
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut state = self.lock()?;
        let removed_value = state.values.remove(key).is_some();
        let removed_set = state.sets.remove(key).is_some();
        Ok(removed_value || removed_set)
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        let mut state = self.lock()?;
        if state.values.contains_key(set) {
            return Err(StoreError::backend(
                "sadd",
                format!("WRONGTYPE {set} holds a string value"),
            ));
        }
        Ok(state
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .sets
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}
