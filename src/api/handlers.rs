//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{TtlCache, TtlStatus};
use crate::clock::SystemClock;
use crate::config::{Config, StorageBackend};
use crate::error::{CacheError, Result};
use crate::models::{
    CleanupResponse, ClearResponse, DeleteResponse, ExistsResponse, GetResponse, HealthResponse,
    PutRequest, PutResponse, StatsResponse, TtlResponse,
};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Application state shared across all handlers.
///
/// The cache is built once at startup and cloned into each handler; clones
/// share the backing store, clock and statistics.
#[derive(Clone)]
pub struct AppState {
    /// The TTL cache
    pub cache: TtlCache,
    /// TTL applied to PUT requests that omit one
    pub default_ttl_ms: u64,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: TtlCache) -> Self {
        Self {
            cache,
            default_ttl_ms: 0,
        }
    }

    /// Sets the TTL used when a PUT request omits one.
    pub fn with_default_ttl(mut self, default_ttl_ms: u64) -> Self {
        self.default_ttl_ms = default_ttl_ms;
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the configured backing store and pairs it with the system clock.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::open(&config.storage_path).await?),
        };
        let cache = TtlCache::new(storage, Arc::new(SystemClock));
        Ok(Self::new(cache).with_default_ttl(config.default_ttl_ms))
    }
}

/// Handler for PUT /cache
///
/// Stores a key-value pair with an optional TTL in milliseconds.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.unwrap_or(state.default_ttl_ms);
    state.cache.put(&req.key, &req.value, ttl).await?;

    Ok(Json(PutResponse::new(req.key, ttl)))
}

/// Handler for GET /cache/:key
///
/// Returns 404 when the key is absent or has expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /cache/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let exists = state.cache.contains(&key).await?;
    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for GET /cache/:key/ttl
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TtlResponse>> {
    let ttl = match state.cache.ttl(&key).await? {
        TtlStatus::Missing => return Err(CacheError::NotFound(key)),
        TtlStatus::Forever => None,
        TtlStatus::Remaining(ms) => Some(ms),
    };
    Ok(Json(TtlResponse { key, ttl }))
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.remove(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    state.cache.clear().await?;
    Ok(Json(ClearResponse::new()))
}

/// Handler for POST /cache/cleanup
///
/// Runs an expiry sweep immediately.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    let removed = state.cache.clean_expired().await?;
    Ok(Json(CleanupResponse { removed }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let entries = state.cache.size().await?;
    let stats = state.cache.stats().await;
    Ok(Json(StatsResponse::new(&stats, entries)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
