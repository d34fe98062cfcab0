//! Cache configuration.

use std::env;

use sysacad_config::parse_flag;

/// Cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_ENABLED`: `false` turns caching off (default: `true`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `CACHE_PREFIX`: Prefix for all cache keys (default: `sysacad`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub redis_url: String,
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: "redis://127.0.0.1:6379".into(),
            key_prefix: "sysacad".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.key_prefix, "sysacad");
    }
}
