//! Authentication middleware and extractors

use crate::api::server::AppState;
use crate::auth::{validate_token, Claims};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Extract and validate bearer claims from a request
pub fn extract_claims(req: &Request, auth: &AuthConfig) -> Result<Claims> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return validate_token(token, auth);
            }
        }
    }

    Err(Error::Unauthorized)
}

/// Middleware for requiring authentication.
///
/// Validated claims are stored in request extensions for handlers to read.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let claims = extract_claims(&req, &state.config.auth)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{User, UserRole};

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
        }
    }

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method("GET").uri("/");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_claims_no_token() {
        let req = request_with_header(None);
        assert!(extract_claims(&req, &auth_config()).is_err());
    }

    #[test]
    fn test_extract_claims_malformed_header() {
        let req = request_with_header(Some("Token abc"));
        assert!(extract_claims(&req, &auth_config()).is_err());
    }

    #[test]
    fn test_extract_claims_valid_bearer() {
        let auth = auth_config();
        let user = User {
            id: 7,
            email: "pit@team1234.org".to_string(),
            name: "Pit Crew".to_string(),
            role: UserRole::Admin,
            created_at: chrono::Utc::now(),
        };
        let token = crate::auth::create_token(&user, &auth).unwrap();
        let req = request_with_header(Some(&format!("Bearer {}", token)));

        let claims = extract_claims(&req, &auth).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.get_role(), UserRole::Admin);
    }
}
