//! # Sysacad Cache
//!
//! Get/set/invalidate key-value cache used by the domain services.
//!
//! This crate provides:
//! - the [`CacheStore`] trait with a Redis backend, an in-memory backend and
//!   a disabled backend that always misses
//! - the [`Cache`] handle services hold, which (de)serializes JSON and never
//!   fails a request because the cache misbehaved
//! - key builders and TTLs for students and document types
//!
//! # Example
//!
//! ```ignore
//! use sysacad_cache::{Cache, CacheConfig, ttl};
//!
//! let cache = Cache::from_config(&CacheConfig::from_env()).await;
//! let key = cache.keys().student(42);
//!
//! cache.set(&key, &student, ttl::STUDENT).await;
//! let hit: Option<Student> = cache.get(&key).await;
//! cache.invalidate(&key).await;
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use keys::{CacheKeys, ttl};
pub use memory::MemoryCache;
pub use redis::RedisCache;
pub use store::{CacheError, CacheStore, DisabledCache};

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, warn};

/// Shared cache handle.
///
/// Reads turn every backend error into a miss; writes and invalidations log
/// and swallow their errors. Storage stays the source of truth.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    keys: CacheKeys,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.store.backend())
            .field("keys", &self.keys)
            .finish()
    }
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, keys: CacheKeys) -> Self {
        Self { store, keys }
    }

    /// Builds the backend selected by `config`.
    ///
    /// When Redis is unreachable at startup the cache is disabled instead of
    /// failing the boot.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let keys = CacheKeys::new(&config.key_prefix);

        if !config.enabled {
            debug!("Cache disabled by configuration");
            return Self::new(Arc::new(DisabledCache), keys);
        }

        match RedisCache::new(&config.redis_url).await {
            Ok(redis) => Self::new(Arc::new(redis), keys),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, running without cache");
                Self::new(Arc::new(DisabledCache), keys)
            }
        }
    }

    /// Process-local cache, handy for tests and single-instance deployments.
    pub fn memory(prefix: &str) -> Self {
        Self::new(Arc::new(MemoryCache::new()), CacheKeys::new(prefix))
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledCache), CacheKeys::default())
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Cache GET error");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(cache.key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Failed to serialize value for cache");
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw, ttl).await {
            warn!(cache.key = %key, error = %e, "Failed to populate cache");
        }
    }

    /// Deletes `key`; a missing key is not an error.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!(cache.key = %key, error = %e, "Failed to invalidate cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: i64,
        name: String,
    }

    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_memory_round_trip_and_invalidate() {
        let cache = Cache::memory("test");
        let key = cache.keys().student(1);
        let value = Sample {
            id: 1,
            name: "Ana".into(),
        };

        cache.set(&key, &value, ttl::STUDENT).await;
        assert_eq!(cache.get::<Sample>(&key).await, Some(value));

        cache.invalidate(&key).await;
        assert_eq!(cache.get::<Sample>(&key).await, None);

        // invalidating twice is a no-op
        cache.invalidate(&key).await;
    }

    #[tokio::test]
    async fn test_disabled_cache_always_misses() {
        let cache = Cache::disabled();
        let key = cache.keys().students_all();
        cache.set(&key, &vec![1, 2, 3], ttl::STUDENTS_ALL).await;
        assert_eq!(cache.get::<Vec<i32>>(&key).await, None);
        assert_eq!(cache.backend(), "disabled");
    }

    #[tokio::test]
    async fn test_backend_errors_are_swallowed() {
        let cache = Cache::new(Arc::new(FailingStore), CacheKeys::default());
        cache.set("k", &1, ttl::STUDENT).await;
        cache.invalidate("k").await;
        assert_eq!(cache.get::<i32>("k").await, None);
    }

    #[tokio::test]
    async fn test_undecodable_value_is_a_miss() {
        let cache = Cache::memory("test");
        cache.set("k", &"not a sample", ttl::STUDENT).await;
        assert_eq!(cache.get::<Sample>("k").await, None);
    }

    #[tokio::test]
    async fn test_from_config_disabled() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = Cache::from_config(&config).await;
        assert_eq!(cache.backend(), "disabled");
        assert_eq!(cache.keys().student(3), "sysacad:student:3");
    }
}
