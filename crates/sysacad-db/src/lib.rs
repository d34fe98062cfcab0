//! # Sysacad DB
//!
//! PostgreSQL pool initialization and the embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use sysacad_config::DatabaseConfig;
//! use sysacad_db::{MIGRATOR, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! MIGRATOR.run(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sysacad_config::DatabaseConfig;
use tracing::info;

pub use sqlx::PgPool;

/// Migrations under the workspace `migrations/` directory, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("DATABASE_URL must be set")]
    MissingUrl,
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Opens a PostgreSQL connection pool sized by `config.max_connections`.
///
/// The returned pool is cheaply cloneable and meant to be stored in the
/// application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.url.as_deref().ok_or(DbError::MissingUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    MIGRATOR.run(pool).await?;
    info!("Migrations applied");
    Ok(())
}

/// Round-trips a trivial query; used by the health endpoint.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
