//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, delete_handler, exists_handler, get_handler, health_handler,
    put_handler, stats_handler, ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache` - Store a key-value pair
/// - `DELETE /cache` - Remove every cache entry
/// - `GET /cache/:key` - Retrieve a value by key
/// - `DELETE /cache/:key` - Remove a key
/// - `GET /cache/:key/exists` - Check whether a key is live
/// - `GET /cache/:key/ttl` - Remaining lifetime of a key
/// - `POST /cache/cleanup` - Evict expired entries now
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(put_handler).delete(clear_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/cache/:key/exists", get(exists_handler))
        .route("/cache/:key/ttl", get(ttl_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
