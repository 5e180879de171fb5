use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use sled::Db;

use super::KeyValueStore;
use crate::error::{DermascanError, Result};

/// Durable store backed by an embedded `sled` database
///
/// Every write is flushed before returning, so a successful call means the
/// value survives a restart. Batches go through `sled::Batch` and are
/// applied atomically.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Opens the store in the user's data directory.
    ///
    /// Honors `DERMASCAN_STORE_PATH` when set.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("DERMASCAN_STORE_PATH") {
            return Self::open(override_path);
        }
        Self::open(default_store_path()?)
    }

    /// Opens or creates the store at `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dermascan::storage::SledStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SledStore::open(dir.path().join("store")).unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DermascanError::Storage(format!("Failed to create store directory: {}", e))
            })?;
        }
        let db = sled::open(path)
            .map_err(|e| DermascanError::Storage(format!("Failed to open store: {}", e)))?;
        tracing::debug!("Opened key-value store at {}", path.display());
        Ok(Self { db })
    }

    async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| DermascanError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

/// Location used when no explicit store path is configured.
pub fn default_store_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("app", "dermascan", "dermascan")
        .ok_or_else(|| DermascanError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("store"))
}

fn decode(bytes: sled::IVec) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| DermascanError::Storage(format!("Stored value is not UTF-8: {}", e)).into())
}

#[async_trait]
impl KeyValueStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| DermascanError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| DermascanError::Storage(format!("Insert failed: {}", e)))?;
        self.flush().await
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(key.as_bytes(), value.as_bytes());
        }
        self.db
            .apply_batch(batch)
            .map_err(|e| DermascanError::Storage(format!("Batch insert failed: {}", e)))?;
        self.flush().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| DermascanError::Storage(format!("Remove failed: {}", e)))?;
        self.flush().await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(key.as_bytes());
        }
        self.db
            .apply_batch(batch)
            .map_err(|e| DermascanError::Storage(format!("Batch remove failed: {}", e)))?;
        self.flush().await
    }

    async fn clear(&self) -> Result<()> {
        self.db
            .clear()
            .map_err(|e| DermascanError::Storage(format!("Clear failed: {}", e)))?;
        self.flush().await
    }
}
