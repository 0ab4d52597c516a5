use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::Config;

pub async fn get_db_pool(cfg: &Config) -> Result<Pool<Sqlite>, sqlx::Error> {
    info!(url = %cfg.database_url, max_connections = cfg.max_connections, "Connecting to database");

    SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.database_url)
        .await
}

/// Private in-memory database. Every SQLite connection to `:memory:` is its
/// own database, so the pool holds exactly one connection that never expires.
pub async fn memory_pool() -> Result<Pool<Sqlite>, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await
}
