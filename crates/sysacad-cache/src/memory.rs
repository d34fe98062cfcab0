//! In-process backend. Expired entries are dropped when read and swept on
//! every write.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::store::{CacheError, CacheStore};

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|(_, exp)| *exp > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> CacheError {
        CacheError::Unavailable("memory cache lock poisoned".into())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
