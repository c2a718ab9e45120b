//! Cache Entry Module
//!
//! Defines the record stored for each cache key and its expiry rules.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Cache Entry ==
/// A single cached value with the metadata needed to judge its freshness.
///
/// Entries are never mutated; a new `put` replaces the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Logical key, without the storage namespace prefix
    pub key: String,
    /// The stored value
    pub value: String,
    /// Write timestamp (Unix milliseconds) taken from the time provider
    #[serde(rename = "timestamp")]
    pub written_at_ms: i64,
    /// Time-to-live in milliseconds, 0 = no expiration
    #[serde(rename = "ttl")]
    pub ttl_ms: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms`.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        now_ms: i64,
        ttl_ms: u64,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            written_at_ms: now_ms,
            ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry expires once strictly more than `ttl_ms` has elapsed since it
    /// was written. Entries with a zero TTL never expire, and a clock that
    /// reads earlier than the write time never expires anything.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        if self.ttl_ms == 0 {
            return false;
        }
        let elapsed = i128::from(now_ms) - i128::from(self.written_at_ms);
        elapsed > i128::from(self.ttl_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> Option<u64> {
        if self.ttl_ms == 0 {
            return None;
        }
        let deadline = i128::from(self.written_at_ms) + i128::from(self.ttl_ms);
        let remaining = (deadline - i128::from(now_ms)).max(0);
        Some(u64::try_from(remaining).unwrap_or(u64::MAX))
    }

    // == Encoding ==
    /// Serializes the entry to its stored JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an entry from its stored JSON form.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new("flag", "on", 0, 0);

        assert!(!entry.is_expired(0));
        assert!(!entry.is_expired(10_000_000));
        assert!(!entry.is_expired(i64::MAX));
        assert!(entry.ttl_remaining_ms(5).is_none());
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let entry = CacheEntry::new("session", "abc123", 0, 5_000);

        assert!(!entry.is_expired(1_000));
        // Exactly ttl elapsed is still fresh
        assert!(!entry.is_expired(5_000));
        assert!(entry.is_expired(5_001));
        assert!(entry.is_expired(6_000));
    }

    #[test]
    fn test_clock_behind_write_time_is_fresh() {
        let entry = CacheEntry::new("k", "v", 10_000, 100);
        assert!(!entry.is_expired(0));
        assert!(!entry.is_expired(i64::MIN));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("k", "v", 1_000, 10_000);

        assert_eq!(entry.ttl_remaining_ms(1_000), Some(10_000));
        assert_eq!(entry.ttl_remaining_ms(4_000), Some(7_000));
        assert_eq!(entry.ttl_remaining_ms(20_000), Some(0));
    }

    #[test]
    fn test_stored_field_names() {
        let entry = CacheEntry::new("user", "{\"id\":1}", 1_700_000_000_000, 60_000);
        let json: serde_json::Value = serde_json::from_str(&entry.to_json().unwrap()).unwrap();

        assert_eq!(json["key"], "user");
        assert_eq!(json["value"], "{\"id\":1}");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
        assert_eq!(json["ttl"], 60_000);
    }

    #[test]
    fn test_from_json_restores_all_fields() {
        let raw = r#"{"key":"a","value":"b","timestamp":-5,"ttl":7}"#;
        let entry = CacheEntry::from_json(raw).unwrap();

        assert_eq!(entry, CacheEntry::new("a", "b", -5, 7));
    }

    #[test]
    fn test_negative_ttl_is_rejected() {
        let raw = r#"{"key":"a","value":"b","timestamp":0,"ttl":-1}"#;
        let result = CacheEntry::from_json(raw);

        assert!(matches!(result, Err(CacheError::Serialization { .. })));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            CacheEntry::from_json("not an entry"),
            Err(CacheError::Serialization { .. })
        ));
    }
}
