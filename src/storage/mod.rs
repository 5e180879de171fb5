//! Persistent key-value store
//!
//! All client state lives in a flat string-to-string store. The
//! [`KeyValueStore`] trait is the seam every component depends on;
//! [`SledStore`] is the durable backend used by the CLI and [`MemoryStore`]
//! is a volatile backend for tests and ephemeral sessions.
//!
//! Every operation may fail. Callers treat a failure as "not durably saved"
//! and surface it instead of continuing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DermascanError, Result};

pub mod keys;
mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Asynchronous string key-value store
///
/// Writes made through [`set_many`](KeyValueStore::set_many) are applied in
/// slice order. Backends are not required to make a batch atomic; callers
/// that need crash safety order their writes so that any prefix of the batch
/// is a consistent state.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Stores several entries.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes several keys. Absent keys are ignored.
    async fn remove_many(&self, keys: &[&str]) -> Result<()>;

    /// Removes every key.
    async fn clear(&self) -> Result<()>;
}

/// Reads and deserializes a JSON value stored under `key`.
///
/// # Errors
///
/// Returns `DermascanError::Storage` if the stored text is not valid JSON
/// for `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).map_err(|e| {
                DermascanError::Storage(format!("Corrupt value under {}: {}", key, e))
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serializes `value` to JSON and stores it under `key`.
///
/// # Errors
///
/// Returns `DermascanError::Serialization` if `value` cannot be encoded;
/// nothing is written in that case.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(DermascanError::Serialization)?;
    store.set(key, &raw).await
}
