//! Redis backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, instrument};

use crate::store::{CacheError, CacheStore};

/// Redis client over a multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to `redis_url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Redis` if the URL is invalid or the server is unreachable.
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?;
        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        debug!(cache.key = %key, "Cache invalidated");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running Redis instance.
    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_delete() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();

        cache
            .set("sysacad:test:key", "\"value\"".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("sysacad:test:key").await.unwrap().as_deref(),
            Some("\"value\"")
        );

        cache.delete("sysacad:test:key").await.unwrap();
        assert_eq!(cache.get("sysacad:test:key").await.unwrap(), None);
    }
}
