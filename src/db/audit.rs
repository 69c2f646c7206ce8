//! Audit log repository
//!
//! Append-only record of security-relevant actions. Writes happen after
//! the action they describe has succeeded, and callers on the request
//! path use `record_best_effort` so a logging failure can never fail the
//! user-facing operation.

use crate::db::DbPool;
use crate::error::Result;
use tracing::warn;

/// A single audit log entry
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub description: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEntry {
    /// Start an entry for the given action tag, e.g. `auth.login`
    pub fn new(action: &str) -> Self {
        Self {
            user_id: None,
            action: action.to_string(),
            entity_type: None,
            entity_id: None,
            description: None,
            client_ip: None,
            user_agent: None,
        }
    }

    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn entity(mut self, entity_type: &str, entity_id: impl ToString) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn client(mut self, client_ip: Option<String>, user_agent: Option<String>) -> Self {
        self.client_ip = client_ip;
        self.user_agent = user_agent;
        self
    }
}

/// Repository for audit log writes
#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: DbPool,
}

impl AuditLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append an entry to the audit log
    pub async fn record(&self, entry: AuditEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO audit_log \
             (user_id, action, entity_type, entity_id, description, client_ip, user_agent, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.description)
        .bind(&entry.client_ip)
        .bind(&entry.user_agent)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append an entry, logging failures instead of propagating them.
    /// The primary request outcome never depends on the audit write.
    pub async fn record_best_effort(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.record(entry).await {
            warn!(action = %action, error = %e, "Failed to write audit log entry");
        }
    }
}
