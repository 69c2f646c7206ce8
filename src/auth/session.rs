//! Session management
//!
//! Sessions live in the `sessions` table of the main database. They are
//! created at login and registration, revoked by deletion at logout, and
//! carry no expiry of their own; the bearer token handles time-bounding.

use crate::db::DbPool;
use crate::error::Result;
use sqlx::FromRow;
use uuid::Uuid;

/// Session information
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Session ID
    pub id: String,
    /// User this session belongs to
    pub user_id: i64,
    /// When the session was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// SQLite-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: DbPool,
}

impl SessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new session for a user and return its id
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Get a session by ID
    pub async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at FROM sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Delete a session. Deleting an absent session is not an error.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete all sessions belonging to a user
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
