//! Durable key/value storage port
//!
//! The credential set is persisted as a handful of named string entries.
//! Writes are submitted as a batch so one token exchange never lands
//! half-applied.

use async_trait::async_trait;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A single change in a storage batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWrite {
    /// Insert or replace an entry.
    Set {
        /// Entry name.
        key: String,
        /// New value.
        value: String,
    },
    /// Remove an entry if present.
    Remove {
        /// Entry name.
        key: String,
    },
}

impl StorageWrite {
    /// Creates a `Set` write.
    #[must_use]
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a `Remove` write.
    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }
}

/// Port for durable client-side key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one entry.
    ///
    /// # Returns
    /// `None` if the entry does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Reads several entries from one consistent snapshot.
    ///
    /// A batch applied concurrently is either fully visible or not at all.
    ///
    /// # Returns
    /// One value per key, in the order of `keys`.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError>;

    /// Applies every write in `batch` as one unit.
    ///
    /// # Errors
    /// Returns an error if the batch could not be persisted; in that case
    /// none of its writes are visible.
    async fn apply(&self, batch: &[StorageWrite]) -> Result<(), StorageError>;
}
