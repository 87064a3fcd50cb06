//! ClauseGuard Cache Library
//!
//! Short-lived blob storage for uploaded contracts and serialized analyses.
//!
//! # Key format
//!
//! Keys are always scoped to the owning user. Key generation is centralized in
//! the `keys` module:
//!
//! - **Uploaded file**: `file:{user_id}:{unix_millis}:{nonce}`
//! - **Serialized analysis**: `contract:{user_id}:{analysis_id}`

pub mod keys;
pub mod memory;
#[cfg(feature = "cache-redis")]
pub mod redis_cache;
pub mod traits;

pub use memory::InMemoryCache;
#[cfg(feature = "cache-redis")]
pub use redis_cache::RedisCache;
pub use traits::{BlobCache, CacheError, CacheResult};
