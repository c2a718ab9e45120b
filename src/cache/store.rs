//! Cache Store Module
//!
//! TTL cache that writes through a pluggable key-value store and evicts
//! expired entries when they are read.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, CACHE_KEY_PREFIX};
use crate::clock::TimeProvider;
use crate::error::{CacheError, Result};
use crate::storage::KeyValueStorage;

// == TTL Status ==
/// Remaining lifetime of a key, as reported by [`TtlCache::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlStatus {
    /// The key is absent or has expired
    Missing,
    /// The key was written without a TTL
    Forever,
    /// Milliseconds left before the key expires
    Remaining(u64),
}

// == TTL Cache ==
/// String cache with optional per-entry expiry.
///
/// The storage and time source are injected and shared; cloning the cache
/// shares them along with the statistics.
///
/// No lock spans the read, expiry check and eviction of `get`/`contains`.
/// Evictions use compare-and-delete against the exact record that was read,
/// so a `put` that lands in between is never discarded.
#[derive(Debug, Clone)]
pub struct TtlCache {
    /// Backing key-value store
    storage: Arc<dyn KeyValueStorage>,
    /// Source of write timestamps and expiry checks
    clock: Arc<dyn TimeProvider>,
    /// Activity counters
    stats: Arc<Mutex<CacheStats>>,
}

/// Returns the backing-store key for a logical cache key.
pub fn storage_key(key: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, key)
}

impl TtlCache {
    // == Constructor ==
    /// Creates a cache over `storage`, stamping writes with `clock`.
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            storage,
            clock,
            stats: Arc::new(Mutex::new(CacheStats::new())),
        }
    }

    // == Put ==
    /// Stores `value` under `key`, expiring after `ttl_ms` milliseconds.
    ///
    /// A `ttl_ms` of 0 means the entry never expires. Any previous entry
    /// under the same key is replaced, and its TTL with it. Any key and value
    /// are accepted, including empty ones; size limits belong to callers.
    pub async fn put(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        let entry = CacheEntry::new(key, value, self.clock.now_millis(), ttl_ms);
        let raw = entry.to_json()?;
        self.storage.put_string(&storage_key(key), &raw).await?;

        self.stats.lock().await.record_write();
        debug!("Cached '{}' (ttl={}ms)", key, ttl_ms);
        Ok(())
    }

    /// Stores `value` under `key` with no expiry.
    pub async fn put_forever(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, value, 0).await
    }

    // == Get ==
    /// Returns the value under `key`, or `None` if it is absent or expired.
    ///
    /// An expired entry is deleted as a side effect. That delete is best
    /// effort: if it fails the read still succeeds with `None`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now_millis();
        let found = self.lookup(key, now).await?;

        let mut stats = self.stats.lock().await;
        match found {
            Some(entry) => {
                stats.record_hit();
                Ok(Some(entry.value))
            }
            None => {
                stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Contains ==
    /// Returns true if `key` holds a value that has not expired.
    ///
    /// Evicts an expired entry exactly like [`get`](Self::get).
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let now = self.clock.now_millis();
        Ok(self.lookup(key, now).await?.is_some())
    }

    // == TTL ==
    /// Reports how long `key` has left to live.
    pub async fn ttl(&self, key: &str) -> Result<TtlStatus> {
        let now = self.clock.now_millis();
        let status = match self.lookup(key, now).await? {
            None => TtlStatus::Missing,
            Some(entry) => match entry.ttl_remaining_ms(now) {
                None => TtlStatus::Forever,
                Some(ms) => TtlStatus::Remaining(ms),
            },
        };
        Ok(status)
    }

    // == Remove ==
    /// Deletes `key`. Removing a key that does not exist succeeds and is
    /// not counted as a removal.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let storage_key = storage_key(key);
        let existed = self.storage.contains(&storage_key).await?;
        self.storage.remove(&storage_key).await?;

        if existed {
            self.stats.lock().await.record_removals(1);
        }
        Ok(())
    }

    // == Clear ==
    /// Removes every cache entry, leaving unrelated keys in the store alone.
    ///
    /// If the backing store cannot list its keys this does nothing and still
    /// returns `Ok(())`.
    pub async fn clear(&self) -> Result<()> {
        let Some(keys) = self.cache_keys().await? else {
            warn!("Backing store cannot enumerate keys; clear is a no-op");
            return Ok(());
        };

        let count = self.storage.remove_many(&keys).await?;

        self.stats.lock().await.record_removals(count as u64);
        info!("Cleared {} cache entries", count);
        Ok(())
    }

    // == Size ==
    /// Returns the number of cache entries held by the backing store.
    ///
    /// Expired entries that have not been evicted yet are counted. Returns 0
    /// if the backing store cannot list its keys.
    pub async fn size(&self) -> Result<u64> {
        match self.cache_keys().await? {
            Some(keys) => Ok(keys.len() as u64),
            None => {
                debug!("Backing store cannot enumerate keys; reporting size 0");
                Ok(0)
            }
        }
    }

    // == Clean Expired ==
    /// Evicts every expired cache entry and returns how many were removed.
    ///
    /// Entries that cannot be decoded are skipped. Returns 0 without doing
    /// anything if the backing store cannot list its keys.
    pub async fn clean_expired(&self) -> Result<usize> {
        let Some(keys) = self.cache_keys().await? else {
            debug!("Backing store cannot enumerate keys; skipping expiry sweep");
            return Ok(0);
        };

        let now = self.clock.now_millis();
        let mut expired = Vec::new();

        for key in keys {
            let Some(raw) = self.storage.get_string(&key).await? else {
                continue;
            };
            let entry = match CacheEntry::from_json(&raw) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping undecodable cache entry '{}': {}", key, e);
                    continue;
                }
            };
            if entry.is_expired(now) {
                expired.push((key, raw));
            }
        }

        // One batch so durable stores write once per sweep
        let removed = if expired.is_empty() {
            0
        } else {
            self.storage.remove_many_if_equals(&expired).await?
        };

        if removed > 0 {
            self.stats.lock().await.record_expirations(removed as u64);
        }
        Ok(removed)
    }

    // == Typed Helpers ==
    /// Serializes `value` to JSON and stores it like [`put`](Self::put).
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_ms: u64) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| CacheError::serialization("Failed to encode value", &e))?;
        self.put(key, &raw, ttl_ms).await
    }

    /// Reads a value stored with [`put_json`](Self::put_json).
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CacheError::serialization("Failed to decode value", &e)),
            None => Ok(None),
        }
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    /// Reads and decodes `key`, evicting it if it has expired at `now`.
    async fn lookup(&self, key: &str, now: i64) -> Result<Option<CacheEntry>> {
        let storage_key = storage_key(key);
        let Some(raw) = self.storage.get_string(&storage_key).await? else {
            return Ok(None);
        };

        let entry = CacheEntry::from_json(&raw)?;
        if entry.is_expired(now) {
            self.evict_expired(&storage_key, &raw).await;
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Deletes an expired record if it is still the one stored.
    async fn evict_expired(&self, storage_key: &str, raw: &str) {
        match self.storage.remove_if_equals(storage_key, raw).await {
            Ok(true) => {
                self.stats.lock().await.record_expirations(1);
                debug!("Evicted expired entry '{}'", storage_key);
            }
            Ok(false) => debug!("Entry '{}' was rewritten before eviction", storage_key),
            Err(e) => warn!("Failed to evict expired entry '{}': {}", storage_key, e),
        }
    }

    /// Lists the backing-store keys that belong to the cache namespace.
    async fn cache_keys(&self) -> Result<Option<Vec<String>>> {
        Ok(self.storage.keys().await?.map(|keys| {
            keys.into_iter()
                .filter(|k| k.starts_with(CACHE_KEY_PREFIX))
                .collect()
        }))
    }
}
