//! # Sysacad Config
//!
//! Configuration types for the student service.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`academic`]: academic service client and circuit breaker settings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: listen address
//! - [`storage`]: student delete policy
//!
//! Every struct has a `from_env()` constructor and a `Default` that agrees
//! with the environment defaults.
//!
//! # Example
//!
//! ```ignore
//! use sysacad_config::{AcademicServiceConfig, CorsConfig, DeletePolicy};
//!
//! let academic = AcademicServiceConfig::from_env();
//! let cors = CorsConfig::from_env();
//! let policy = DeletePolicy::from_env();
//! ```

pub mod academic;
pub mod cors;
pub mod database;
pub mod server;
pub mod storage;

pub use academic::AcademicServiceConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use storage::{DeletePolicy, ParseDeletePolicyError};

use std::env;
use std::str::FromStr;

/// Reads `key` and parses it, falling back to `default` when the variable is
/// unset or does not parse.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok().as_deref(), default)
}

pub(crate) fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value
        .map(str::trim)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Interprets common spellings of a boolean flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or::<u64>(None, 5), 5);
        assert_eq!(parse_or::<u64>(Some("abc"), 5), 5);
        assert_eq!(parse_or::<u64>(Some(" 12 "), 5), 12);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
