//! PostgreSQL connection pool management

use std::path::Path;
use std::time::Duration;

use blog_common::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Idle connections are closed after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Connections are recycled after this long
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Create a connection pool from `DATABASE_URL` with default sizing
pub async fn create_pool_from_env() -> Result<PgPool, sqlx::Error> {
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL is not set".into()))?;
    create_pool(&DatabaseConfig::with_url(url)).await
}

/// Apply the SQL migrations found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: impl AsRef<Path>) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir.as_ref()).await?;
    migrator.run(pool).await?;
    info!(count = migrator.iter().count(), "Migrations applied");
    Ok(())
}

/// Directory holding this crate's migrations
pub fn migrations_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"))
}
