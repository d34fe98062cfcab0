//! Application configuration.
//!
//! [`AppConfig`] gathers every configuration struct the server needs so that
//! the environment is read exactly once at startup. Each piece lives in the
//! crate that consumes it:
//!
//! - [`ServerConfig`], [`DatabaseConfig`], [`CorsConfig`], [`AcademicServiceConfig`]
//!   and [`DeletePolicy`] from `sysacad-config`
//! - [`CacheConfig`] from `sysacad-cache`
//!
//! # Example
//!
//! ```ignore
//! use sysacad::config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env();
//! println!("listening on {}", config.server.address());
//! ```

pub use sysacad_cache::CacheConfig;
pub use sysacad_config::{
    AcademicServiceConfig, CorsConfig, DatabaseConfig, DeletePolicy, ServerConfig,
};

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub cache: CacheConfig,
    pub academic: AcademicServiceConfig,
    pub delete_policy: DeletePolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cors: CorsConfig::from_env(),
            cache: CacheConfig::from_env(),
            academic: AcademicServiceConfig::from_env(),
            delete_policy: DeletePolicy::from_env(),
        }
    }
}
