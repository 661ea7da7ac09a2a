//! Durable storage of the session's credential set.

use std::fmt;
use std::sync::Arc;

use invoicer_domain::{CredentialKey, CredentialSet, CredentialUpdate};
use tracing::{debug, warn};

use crate::ports::{KeyValueStore, StorageWrite};

/// Reads and writes the four credential entries.
///
/// Storage failures never reach callers. A failed read yields the
/// "absent" value for that entry and a failed write leaves storage as it
/// was; both are logged.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Creates a store on top of a key/value backend.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Returns the stored credential set.
    ///
    /// All four entries come from one storage snapshot, so a batch written
    /// concurrently is seen whole or not at all. Missing or unparsable
    /// entries come back as empty strings and a zero expiry.
    pub async fn get(&self) -> CredentialSet {
        let keys = CredentialKey::ALL.map(CredentialKey::as_str);
        let values = match self.storage.get_many(&keys).await {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "failed to read credentials");
                return CredentialSet::default();
            }
        };

        let mut values = values.into_iter().map(Option::unwrap_or_default);
        let mut next = || values.next().unwrap_or_default();
        CredentialSet {
            access_token: next(),
            refresh_token: next(),
            org_token: next(),
            expires_at: next().trim().parse().unwrap_or(0),
        }
    }

    /// Writes the non-empty fields of `update` in one batch.
    pub async fn set(&self, update: &CredentialUpdate) {
        let batch: Vec<StorageWrite> = update
            .entries()
            .into_iter()
            .map(|(key, value)| StorageWrite::set(key.as_str(), value))
            .collect();
        if batch.is_empty() {
            return;
        }

        match self.storage.apply(&batch).await {
            Ok(()) => debug!(entries = batch.len(), "credentials stored"),
            Err(e) => warn!(error = %e, "failed to store credentials"),
        }
    }

    /// Removes all four entries.
    pub async fn clear(&self) {
        let batch: Vec<StorageWrite> = CredentialKey::ALL
            .iter()
            .map(|key| StorageWrite::remove(key.as_str()))
            .collect();

        match self.storage.apply(&batch).await {
            Ok(()) => debug!("credentials cleared"),
            Err(e) => warn!(error = %e, "failed to clear credentials"),
        }
    }

}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
