//! Expiry Sweep Task
//!
//! Background task that periodically evicts expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;

/// Spawns a background task that periodically evicts expired cache entries.
///
/// The task loops forever, sleeping for `cleanup_interval_secs` between
/// sweeps. Sweep failures are logged and the loop carries on. Against a
/// backing store that cannot enumerate keys each sweep is a no-op.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: TtlCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.clean_expired().await {
                Ok(0) => debug!("Expiry sweep: no expired entries found"),
                Ok(removed) => info!("Expiry sweep: removed {} expired entries", removed),
                Err(e) => warn!("Expiry sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::storage::{KeyValueStorage, MemoryStorage};

    fn test_cache() -> (TtlCache, MemoryStorage, Arc<ManualClock>) {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(0));
        let cache = TtlCache::new(Arc::new(storage.clone()), clock.clone());
        (cache, storage, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let (cache, storage, clock) = test_cache();

        cache.put("expire_soon", "value", 1_000).await.unwrap();
        cache.put("long_lived", "value", 3_600_000).await.unwrap();
        clock.set(2_000);

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Paused runtime: sleeping lets the sweep's timer fire
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert!(!storage.contains("cache_expire_soon").await.unwrap());
        assert!(storage.contains("cache_long_lived").await.unwrap());
        assert_eq!(cache.stats().await.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (cache, _, _) = test_cache();

        let handle = spawn_cleanup_task(cache, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
