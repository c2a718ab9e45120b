//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Which backing store the server writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map, lost on restart
    Memory,
    /// JSON file at `Config::storage_path`
    File,
}

impl StorageBackend {
    /// Parses a backend name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StorageBackend::Memory),
            "file" => Some(StorageBackend::File),
            _ => None,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds, 0 = disabled
    pub cleanup_interval: u64,
    /// Backing store kind
    pub storage_backend: StorageBackend,
    /// File used by the file backend
    pub storage_path: PathBuf,
    /// TTL in milliseconds for requests that omit one, 0 = never expire
    pub default_ttl_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `STORAGE_BACKEND` - `memory` or `file` (default: memory)
    /// - `STORAGE_PATH` - File backend location (default: ttl_store.json)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(name) => StorageBackend::parse(&name).unwrap_or_else(|| {
                warn!("Unknown STORAGE_BACKEND '{}', using memory", name);
                StorageBackend::Memory
            }),
            Err(_) => defaults.storage_backend,
        };

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            storage_backend,
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            storage_backend: StorageBackend::Memory,
            storage_path: PathBuf::from("ttl_store.json"),
            default_ttl_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.storage_path, PathBuf::from("ttl_store.json"));
        assert_eq!(config.default_ttl_ms, 0);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("STORAGE_BACKEND");
        env::remove_var("STORAGE_PATH");
        env::remove_var("DEFAULT_TTL_MS");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.default_ttl_ms, 0);
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse(" FILE "), Some(StorageBackend::File));
        assert_eq!(StorageBackend::parse("redis"), None);
    }
}
