//! Embedded schema migrations
//!
//! Migration scripts are compiled into the binary and applied in order.
//! Applied versions are tracked in the `_migrations` table, so running
//! the set again is a no-op.

use crate::db::DbPool;
use crate::error::Result;
use sqlx::Row;
use tracing::info;

const MIGRATIONS: &[(&str, &str)] = &[("0001_init", include_str!("../../migrations/0001_init.sql"))];

/// Apply any migrations that have not been applied yet
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (name TEXT PRIMARY KEY, applied_at TEXT NOT NULL)",
    )
    .execute(pool)
    .await?;

    for &(name, script) in MIGRATIONS {
        let applied = sqlx::query("SELECT name FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?
            .is_some();

        if applied {
            continue;
        }

        sqlx::raw_sql(script).execute(pool).await?;

        sqlx::query("INSERT INTO _migrations (name, applied_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now())
            .execute(pool)
            .await?;

        info!(migration = name, "Applied database migration");
    }

    Ok(())
}

/// List applied migration names, oldest first
pub async fn applied_migrations(pool: &DbPool) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT name FROM _migrations ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| row.get("name")).collect())
}
