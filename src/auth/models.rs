//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access, can manage members and settings
    Admin,
    /// Team member - regular portal account
    Member,
    /// Guest - limited access
    Guest,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Member => write!(f, "member"),
            UserRole::Guest => write!(f, "guest"),
        }
    }
}

impl FromStr for UserRole {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "member" => Ok(UserRole::Member),
            "guest" => Ok(UserRole::Guest),
            other => Err(crate::error::Error::InvalidInput(format!(
                "Unknown role '{}'",
                other
            ))),
        }
    }
}

/// User identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: i64,
    /// Email address used for login, stored lowercased
    pub email: String,
    /// Display name
    pub name: String,
    /// User's role
    pub role: UserRole,
    /// When the account was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Normalize an email for lookup and storage
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
}

/// Password change payload
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Issued credentials returned from login and registration
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserInfo,
    pub token: String,
    pub session_id: String,
}

/// User information in responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Member, UserRole::Guest] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("mentor".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(User::normalize_email("  Alice@Team1234.ORG "), "alice@team1234.org");
    }
}
