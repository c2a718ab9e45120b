//! Error types for the TTL store
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its backing stores.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing key-value store failed to read, write, or delete
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        /// Type name of the underlying error, when there was one
        cause: Option<String>,
    },

    /// A stored entry could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        cause: Option<String>,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found (HTTP layer only; the cache itself reports absence as `None`)
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Builds a storage error that records the type of the underlying failure.
    pub fn storage<E>(message: impl Into<String>, cause: &E) -> Self
    where
        E: std::error::Error,
    {
        CacheError::Storage {
            message: format!("{}: {}", message.into(), cause),
            cause: Some(std::any::type_name::<E>().to_string()),
        }
    }

    /// Builds a serialization error that records the type of the underlying failure.
    pub fn serialization<E>(message: impl Into<String>, cause: &E) -> Self
    where
        E: std::error::Error,
    {
        CacheError::Serialization {
            message: format!("{}: {}", message.into(), cause),
            cause: Some(std::any::type_name::<E>().to_string()),
        }
    }

    /// Returns the underlying cause's type name, if any.
    pub fn cause(&self) -> Option<&str> {
        match self {
            CacheError::Storage { cause, .. } | CacheError::Serialization { cause, .. } => {
                cause.as_deref()
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::serialization("Invalid cache entry", &err)
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::storage("I/O failure", &err)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the TTL store.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_converts_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CacheError = err.into();

        assert!(matches!(err, CacheError::Serialization { .. }));
        assert!(err.cause().is_some_and(|c| c.starts_with("serde_json")));
    }

    #[test]
    fn test_io_error_converts_to_storage() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CacheError = err.into();

        assert!(matches!(err, CacheError::Storage { .. }));
        assert!(err.to_string().contains("denied"));
        assert!(err.cause().is_some_and(|c| c.contains("io")));
    }

    #[test]
    fn test_error_status_codes() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::storage("write failed", &io), StatusCode::SERVICE_UNAVAILABLE),
            (
                CacheError::Serialization {
                    message: "corrupt".to_string(),
                    cause: None,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }
}
