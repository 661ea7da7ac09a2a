//! In-memory key/value storage.

use std::collections::HashMap;

use async_trait::async_trait;
use invoicer_application::ports::{KeyValueStore, StorageError, StorageWrite};
use tokio::sync::RwLock;

/// Thread-safe in-memory key/value store.
///
/// Nothing survives the process; useful for one-shot sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    async fn apply(&self, batch: &[StorageWrite]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for write in batch {
            match write {
                StorageWrite::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                StorageWrite::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
