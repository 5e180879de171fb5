use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::Result;

/// Volatile in-process store
///
/// Contents are lost when the value is dropped. A single lock guards the
/// map, so batches are applied atomically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_returns_exact_value() {
        let store = MemoryStore::new();
        store.set("k", "  spaced value\n").await.unwrap();
        assert_eq!(
            store.get("k").await.unwrap().as_deref(),
            Some("  spaced value\n")
        );
    }

    #[tokio::test]
    async fn test_remove_many_ignores_absent_keys() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        store.remove_many(&["a", "b"]).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = MemoryStore::new();
        store
            .set_many(&[("a".into(), "1".into()), ("b".into(), "2".into())])
            .await
            .unwrap();
        assert_eq!(store.len().await, 2);
        store.clear().await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }
}
