//! Credential file persistence.
//!
//! Entries are stored as one flat JSON object in the platform-specific
//! config directory:
//! - Linux: ~/.config/invoicer/credentials.json
//! - macOS: ~/Library/Application Support/invoicer/credentials.json
//! - Windows: %APPDATA%/invoicer/credentials.json

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use invoicer_application::ports::{KeyValueStore, StorageError, StorageWrite};
use tokio::fs;
use tokio::sync::Mutex;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Key/value store backed by a single JSON file.
///
/// Each batch rewrites the file through a temporary sibling and a rename,
/// so readers see either the old or the new content.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the default credentials file path, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("invoicer").join("credentials.json"))
    }

    /// The file this store writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path).await {
            Ok(content) => from_json_bytes(&content).map_err(to_storage_error),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable_bytes(entries).map_err(to_storage_error)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        restrict_permissions(&tmp).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut entries = self.load().await?;
        Ok(keys.iter().map(|key| entries.remove(*key)).collect())
    }

    async fn apply(&self, batch: &[StorageWrite]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
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
        self.save(&entries).await
    }
}

fn to_storage_error(e: SerializationError) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
