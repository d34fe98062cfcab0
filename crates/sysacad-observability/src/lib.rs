//! # Sysacad Observability
//!
//! Installs the global `tracing` subscriber.
//!
//! # Configuration
//!
//! - `RUST_LOG`: full filter directive, takes precedence when set
//! - `LOG_LEVEL`: level for everything else (default: `info`); noisy
//!   dependencies are held at `warn`
//! - `LOG_FORMAT`: `json` for one JSON object per line, anything else for the
//!   compact console format
//!
//! ```no_run
//! sysacad_observability::init_logging();
//! tracing::info!("ready");
//! ```

use std::env;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }

    pub fn from_env() -> Self {
        env::var("LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(level: &str) -> String {
    format!("{level},tower_http=warn,hyper=warn,h2=warn,sqlx=warn,reqwest=warn")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(default_directive(&level))
    })
}

/// Installs the subscriber. Calling it twice is harmless: the second
/// installation is ignored.
pub fn init_logging() {
    let layer = match LogFormat::from_env() {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_filter(env_filter())
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter())
            .boxed(),
    };

    let _ = tracing_subscriber::registry().with(layer).try_init();
}
