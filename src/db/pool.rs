//! Database connection pool management

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a SQLite connection pool from the database configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    if config.max_connections == 0 {
        return Err(Error::Config(
            "database.max_connections must be greater than 0".to_string(),
        ));
    }
    if !config.url.starts_with("sqlite:") {
        return Err(Error::Config(format!(
            "unsupported database URL '{}', expected sqlite://",
            config.url
        )));
    }

    let connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}
