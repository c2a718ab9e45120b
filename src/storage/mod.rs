//! Storage Module
//!
//! The durable key-value contract the cache writes through, plus the
//! backends shipped with the crate.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::error::Result;

// == Key-Value Storage ==
/// String-keyed, string-valued store shared by the cache and the host application.
///
/// Only `put_string`, `get_string`, `remove` and `contains` are required.
/// Enumeration is an optional capability exposed through [`keys`](Self::keys).
#[async_trait]
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug {
    /// Writes `value` under `key`, replacing any previous value.
    async fn put_string(&self, key: &str, value: &str) -> Result<()>;

    /// Reads the value under `key`, or `None` if absent.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Returns true if `key` holds a value.
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Reads the value under `key`, falling back to `default` if absent.
    async fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Lists every key in the store.
    ///
    /// Returns `Ok(None)` when the backend cannot enumerate its keys.
    async fn keys(&self) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    /// Deletes `key` only if it still holds `expected`.
    ///
    /// Returns true if the key was deleted. The default implementation is a
    /// plain read followed by a delete and is not atomic; a write landing
    /// between the two is lost. Backends that can compare and delete under one
    /// lock should override it.
    async fn remove_if_equals(&self, key: &str, expected: &str) -> Result<bool> {
        match self.get_string(key).await? {
            Some(current) if current == expected => {
                self.remove(key).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Deletes every key in `keys` and returns how many were present.
    ///
    /// The default implementation deletes one key at a time. Backends that pay
    /// per write should override it to apply the whole batch at once.
    async fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.contains(key).await? {
                self.remove(key).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Batch form of [`remove_if_equals`](Self::remove_if_equals) over
    /// `(key, expected)` pairs. Returns how many keys were deleted.
    async fn remove_many_if_equals(&self, pairs: &[(String, String)]) -> Result<usize> {
        let mut removed = 0;
        for (key, expected) in pairs {
            if self.remove_if_equals(key, expected).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
