//! PostgreSQL connection settings.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required by the server)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: `10`)

use std::env;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `None` when `DATABASE_URL` is unset; the pool refuses to start then.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}
