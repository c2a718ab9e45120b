//! File-backed backing store
//!
//! Persists the whole key space as one JSON object. Every mutation rewrites
//! the file through a temporary sibling and a rename, so a crash leaves
//! either the old or the new contents on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::storage::KeyValueStorage;

// == File Storage ==
/// Durable store kept in a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    /// Location of the JSON document
    path: PathBuf,
    /// In-memory mirror of the file; the lock also serializes disk writes
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`, loading existing contents.
    ///
    /// A missing file starts an empty store; parent directories are created.
    /// A file that is not a JSON object of strings is a storage error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::storage("Failed to create storage directory", &e))?;
        }

        let entries = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                CacheError::storage(format!("Malformed storage file {}", path.display()), &e)
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CacheError::storage("Failed to read storage file", &e)),
        };

        info!(
            "Opened file storage at {} with {} keys",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` to disk. Callers hold the entries lock.
    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CacheError::storage("Failed to encode storage file", &e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)
            .await
            .map_err(|e| CacheError::storage("Failed to write storage file", &e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CacheError::storage("Failed to replace storage file", &e))?;

        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Persists once after a batch of deletions, restoring `removed` if the
    /// write fails.
    async fn persist_removals(
        &self,
        entries: &mut HashMap<String, String>,
        removed: Vec<(String, String)>,
    ) -> Result<usize> {
        if removed.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.persist(entries).await {
            entries.extend(removed);
            return Err(e);
        }
        Ok(removed.len())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&entries).await {
            // Keep memory in step with the file that is still on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries).await {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn keys(&self) -> Result<Option<Vec<String>>> {
        Ok(Some(self.entries.lock().await.keys().cloned().collect()))
    }

    async fn remove_if_equals(&self, key: &str, expected: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if !entries.get(key).is_some_and(|current| current == expected) {
            return Ok(false);
        }

        let old = entries.remove(key);
        if let Err(e) = self.persist(&entries).await {
            if let Some(old) = old {
                entries.insert(key.to_string(), old);
            }
            return Err(e);
        }
        Ok(true)
    }

    async fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| entries.remove(key).map(|old| (key.clone(), old)))
            .collect();

        self.persist_removals(&mut entries, removed).await
    }

    async fn remove_many_if_equals(&self, pairs: &[(String, String)]) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let mut removed = Vec::new();
        for (key, expected) in pairs {
            if entries.get(key).is_some_and(|current| current == expected) {
                if let Some(old) = entries.remove(key) {
                    removed.push((key.clone(), old));
                }
            }
        }

        self.persist_removals(&mut entries, removed).await
    }
}
