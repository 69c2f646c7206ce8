//! JWT token handling

use crate::auth::models::{User, UserRole};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email address
    pub email: String,
    /// User role
    pub role: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Create claims from a user with the given lifetime
    pub fn from_user(user: &User, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    /// Get the numeric user id from the subject claim
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| Error::Unauthorized)
    }

    /// Get user role, defaulting to guest for unknown values
    pub fn get_role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::Guest)
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

/// Create a signed bearer token for a user
pub fn create_token(user: &User, auth: &AuthConfig) -> Result<String> {
    let claims = Claims::from_user(user, auth.token_ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Other(format!("Failed to create token: {}", e)))
}

/// Validate and decode a bearer token
pub fn validate_token(token: &str, auth: &AuthConfig) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized)
}
