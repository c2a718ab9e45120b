//! In-memory backing store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::KeyValueStorage;

// == Memory Storage ==
/// HashMap-backed store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys held, cache-namespaced or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn keys(&self) -> Result<Option<Vec<String>>> {
        Ok(Some(self.entries.read().await.keys().cloned().collect()))
    }

    async fn remove_if_equals(&self, key: &str, expected: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|current| current == expected) {
            entries.remove(key);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries.write().await;
        Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count())
    }

    async fn remove_many_if_equals(&self, pairs: &[(String, String)]) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        for (key, expected) in pairs {
            if entries.get(key).is_some_and(|current| current == expected) {
                entries.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let storage = MemoryStorage::new();

        storage.put_string("a", "1").await.unwrap();
        assert_eq!(storage.get_string("a").await.unwrap().as_deref(), Some("1"));
        assert!(storage.contains("a").await.unwrap());

        storage.remove("a").await.unwrap();
        assert!(storage.get_string("a").await.unwrap().is_none());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_string_or_default() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_string_or("missing", "dflt").await.unwrap(), "dflt");

        storage.put_string("present", "v").await.unwrap();
        assert_eq!(storage.get_string_or("present", "dflt").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn test_keys_lists_everything() {
        let storage = MemoryStorage::new();
        storage.put_string("x", "1").await.unwrap();
        storage.put_string("y", "2").await.unwrap();

        let mut keys = storage.keys().await.unwrap().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_if_equals() {
        let storage = MemoryStorage::new();
        storage.put_string("k", "old").await.unwrap();

        assert!(!storage.remove_if_equals("k", "other").await.unwrap());
        assert_eq!(storage.len().await, 1);

        assert!(storage.remove_if_equals("k", "old").await.unwrap());
        assert!(!storage.contains("k").await.unwrap());
        assert!(!storage.remove_if_equals("k", "old").await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_removals() {
        let storage = MemoryStorage::new();
        storage.put_string("a", "1").await.unwrap();
        storage.put_string("b", "2").await.unwrap();
        storage.put_string("c", "3").await.unwrap();

        let keys = vec!["a".to_string(), "missing".to_string()];
        assert_eq!(storage.remove_many(&keys).await.unwrap(), 1);

        let pairs = vec![
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "stale".to_string()),
        ];
        assert_eq!(storage.remove_many_if_equals(&pairs).await.unwrap(), 1);
        assert_eq!(storage.keys().await.unwrap().unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.put_string("shared", "yes").await.unwrap();
        assert!(other.contains("shared").await.unwrap());
    }
}
