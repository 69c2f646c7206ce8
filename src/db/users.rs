//! User repository
//!
//! CRUD operations for user records. Password hashes never leave this
//! module except through the explicit `get_with_password` lookups used
//! by the credential-checking paths.

use crate::auth::models::{User, UserRole};
use crate::db::DbPool;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            // Unknown roles in storage degrade to guest rather than failing reads
            role: self.role.parse().unwrap_or(UserRole::Guest),
            created_at: self.created_at,
        }
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Repository for user records
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user. An existing email surfaces as a conflict.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let email = User::normalize_email(&new_user.email);
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, name, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, email, name, password_hash, role, created_at",
        )
        .bind(&email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.to_string())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("An account with this email already exists".to_string())
            }
            _ => Error::Database(e),
        })?;

        Ok(row.into_user())
    }

    /// Look up a user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.fetch_by_email(email).await?.map(UserRow::into_user))
    }

    /// Look up a user together with their stored password hash
    pub async fn get_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        Ok(self.fetch_by_email(email).await?.map(|row| {
            let hash = row.password_hash.clone();
            (row.into_user(), hash)
        }))
    }

    /// Look up a user by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Look up a user by id together with their stored password hash
    pub async fn get_with_password_by_id(&self, id: i64) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| {
            let hash = row.password_hash.clone();
            (row.into_user(), hash)
        }))
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User".to_string()));
        }
        Ok(())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let email = User::normalize_email(email);
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
