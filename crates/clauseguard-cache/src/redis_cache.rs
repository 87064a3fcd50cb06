//! Redis-backed blob cache.

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::traits::{BlobCache, CacheError, CacheResult};

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Backend(err.to_string())
        }
    }
}

/// Blob cache on a single multiplexed Redis connection shared by all requests.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Connection(format!("Invalid Redis URL: {}", e)))?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        tracing::info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl BlobCache for RedisCache {
    async fn set_ex(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value.as_ref(), seconds)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Redis SETEX failed");
                CacheError::from(e)
            })
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Redis GET failed");
            CacheError::from(e)
        })?;
        Ok(value.map(Bytes::from))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _removed: i64 = conn.del(key).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Redis DEL failed");
            CacheError::from(e)
        })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Backend(format!("Unexpected PING reply: {}", pong)))
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
