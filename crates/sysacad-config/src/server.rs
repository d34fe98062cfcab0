use std::env;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Reads `SERVER_HOST` (default `0.0.0.0`) and `SERVER_PORT` (default `8000`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env_or("SERVER_PORT", defaults.port),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}
