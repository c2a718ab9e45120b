//! TTL Store - a string cache with per-entry expiry
//!
//! Writes through a pluggable key-value store, stamps entries with an
//! injected clock, and evicts expired entries when they are read.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{TtlCache, TtlStatus};
pub use clock::{ManualClock, SystemClock, TimeProvider};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use tasks::spawn_cleanup_task;
