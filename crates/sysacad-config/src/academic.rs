//! Settings for the academic service client.
//!
//! # Environment Variables
//!
//! - `ACADEMIC_SERVICE_URL`: base URL (default: `http://academico.universidad.localhost`)
//! - `ACADEMIC_SERVICE_TIMEOUT`: per-request timeout in seconds (default: `5`)
//! - `ACADEMIC_BREAKER_FAILURE_THRESHOLD`: consecutive failures before the
//!   circuit opens (default: `5`)
//! - `ACADEMIC_BREAKER_RESET_TIMEOUT`: seconds the circuit stays open before a
//!   trial call is let through (default: `60`)

use std::env;
use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcademicServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub failure_threshold: u32,
    pub reset_timeout_seconds: u64,
}

impl AcademicServiceConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("ACADEMIC_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout_seconds: env_or("ACADEMIC_SERVICE_TIMEOUT", defaults.timeout_seconds),
            failure_threshold: env_or(
                "ACADEMIC_BREAKER_FAILURE_THRESHOLD",
                defaults.failure_threshold,
            )
            .max(1),
            reset_timeout_seconds: env_or(
                "ACADEMIC_BREAKER_RESET_TIMEOUT",
                defaults.reset_timeout_seconds,
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_seconds)
    }
}

impl Default for AcademicServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://academico.universidad.localhost".into(),
            timeout_seconds: 5,
            failure_threshold: 5,
            reset_timeout_seconds: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AcademicServiceConfig::default();
        assert_eq!(config.base_url, "http://academico.universidad.localhost");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.reset_timeout(), Duration::from_secs(60));
    }
}
