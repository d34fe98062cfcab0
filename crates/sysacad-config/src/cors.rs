use std::env;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.into());
        Self::from_list(&raw)
    }

    /// Parses a comma-separated origin list, dropping empty entries.
    pub fn from_list(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }

    /// `*` anywhere in the list allows any origin.
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::from_list(DEFAULT_ALLOWED_ORIGINS)
    }
}
