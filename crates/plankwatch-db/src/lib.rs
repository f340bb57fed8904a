//! Postgres persistence gateway: pool construction, migrations, and the
//! product and health query modules.

pub mod health;
pub mod products;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use plankwatch_core::AppConfig;

// Path relative to crates/plankwatch-db/Cargo.toml; resolves to
// <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Bring the live schema up to what the writers expect beyond the base
/// migrations: the `external_id` column and its partial unique index, which
/// the upsert path conflicts on.
///
/// Safe to run on every start. A pre-existing column surfaces as Postgres
/// error 42701 and is ignored; any other error propagates.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any failure other than a duplicate column.
pub async fn ensure_external_id_column(pool: &PgPool) -> Result<(), DbError> {
    let alter = sqlx::query("ALTER TABLE products ADD COLUMN external_id TEXT")
        .execute(pool)
        .await;
    match alter {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("42701") => {}
        Err(e) => return Err(e.into()),
    }

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS products_external_id_key \
         ON products (external_id) WHERE external_id IS NOT NULL",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
