//! Cache Module
//!
//! Provides the TTL cache, its stored entry format and activity counters.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{storage_key, TtlCache, TtlStatus};

// == Public Constants ==
/// Prefix applied to every cache key in the backing store
pub const CACHE_KEY_PREFIX: &str = "cache_";

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
