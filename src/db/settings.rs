//! Site settings repository

use crate::db::DbPool;
use crate::error::Result;
use sqlx::Row;

/// Setting key controlling whether self-registration is open
pub const REGISTRATION_ENABLED: &str = "registration_enabled";

/// Repository for the key-value `site_settings` table
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: DbPool,
}

impl SettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a setting value by key
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM site_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    /// Insert or replace a setting
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO site_settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Whether self-registration is open. An absent setting means enabled.
    pub async fn registration_enabled(&self) -> Result<bool> {
        Ok(self.get(REGISTRATION_ENABLED).await?.as_deref() != Some("false"))
    }
}
