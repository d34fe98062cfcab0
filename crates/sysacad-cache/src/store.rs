//! Backend abstraction.

use std::time::Duration;

use async_trait::async_trait;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// A string key-value store with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`; deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    fn backend(&self) -> &'static str;
}

/// Backend used when caching is turned off: never stores, always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
