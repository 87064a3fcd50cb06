//! Cache abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value blob cache with per-entry expiry.
///
/// Entries past their expiry behave exactly like missing entries.
#[async_trait]
pub trait BlobCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry.
    async fn set_ex(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()>;

    /// Fetch the bytes stored under `key`.
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Round-trip to the backend, used by health checks.
    async fn ping(&self) -> CacheResult<()>;

    fn backend_name(&self) -> &'static str;
}
