//! API route handlers
//!
//! Handlers are pure orchestration: validate the payload, call the
//! collaborators in sequence, map the outcome to the response envelope.
//! Nothing is retried; collaborator errors bubble to the error mapper.

use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;

use super::server::AppState;
use crate::auth::models::{
    AuthData, ChangePasswordRequest, LoginRequest, RegisterRequest, User, UserInfo, UserRole,
};
use crate::auth::{jwt, password, Claims};
use crate::db::{AuditEntry, NewUser};
use crate::error::{Error, Result};

const MIN_PASSWORD_LEN: usize = 8;

/// Response envelope shared by all endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserInfo,
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Auth routes

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>> {
    require_field(&req.email, "email")?;
    require_field(&req.password, "password")?;

    let email = User::normalize_email(&req.email);

    let Some((user, hash)) = state.users.get_with_password(&email).await? else {
        // Unknown email must look exactly like a wrong password, including
        // the time a real verification would take
        password::verify_dummy(&req.password);
        tracing::warn!(email = %email, "Login attempt for unknown email");
        return Err(Error::InvalidCredentials);
    };

    if !password::verify_password(&req.password, &hash)? {
        tracing::warn!(user_id = user.id, "Login attempt with incorrect password");
        return Err(Error::InvalidCredentials);
    }

    let session_id = state.sessions.create(user.id).await?;
    let token = jwt::create_token(&user, &state.config.auth)?;

    let (client_ip, user_agent) = client_info(&headers);
    state
        .audit
        .record_best_effort(
            AuditEntry::new("auth.login")
                .user(user.id)
                .entity("user", user.id)
                .description("Logged in")
                .client(client_ip, user_agent),
        )
        .await;

    Ok(Json(ApiResponse::ok(AuthData {
        user: user.into(),
        token,
        session_id,
    })))
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthData>>> {
    require_field(&req.email, "email")?;
    require_field(&req.name, "name")?;
    require_field(&req.password, "password")?;

    if !req.email.contains('@') {
        return Err(Error::InvalidInput("Invalid email address".to_string()));
    }
    if req.password != req.confirm_password {
        return Err(Error::InvalidInput("Passwords do not match".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if !state.settings.registration_enabled().await? {
        return Err(Error::Forbidden("Registration is disabled".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = state
        .users
        .create(NewUser {
            email: req.email,
            name: req.name.trim().to_string(),
            password_hash,
            role: UserRole::Member,
        })
        .await?;

    let session_id = state.sessions.create(user.id).await?;
    let token = jwt::create_token(&user, &state.config.auth)?;

    let (client_ip, user_agent) = client_info(&headers);
    state
        .audit
        .record_best_effort(
            AuditEntry::new("auth.register")
                .user(user.id)
                .entity("user", user.id)
                .description("Account created")
                .client(client_ip, user_agent),
        )
        .await;

    Ok(Json(ApiResponse::ok(AuthData {
        user: user.into(),
        token,
        session_id,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>> {
    // Logout is idempotent: a missing or unknown session id still succeeds
    if let Some(session_id) = headers.get("X-Session-ID").and_then(|v| v.to_str().ok()) {
        if let Some(session) = state.sessions.get(session_id).await? {
            state.sessions.delete(session_id).await?;

            let (client_ip, user_agent) = client_info(&headers);
            state
                .audit
                .record_best_effort(
                    AuditEntry::new("auth.logout")
                        .user(session.user_id)
                        .entity("session", &session.id)
                        .description("Logged out")
                        .client(client_ip, user_agent),
                )
                .await;
        }
    }

    Ok(Json(ApiResponse::message("Logged out")))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserData>>> {
    let user_id = claims.user_id()?;

    // A valid token for a vanished account is no longer authenticated
    let user = state
        .users
        .get_by_id(user_id)
        .await?
        .ok_or(Error::Unauthorized)?;

    Ok(Json(ApiResponse::ok(UserData { user: user.into() })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    require_field(&req.current_password, "current_password")?;
    require_field(&req.new_password, "new_password")?;

    if req.new_password != req.confirm_password {
        return Err(Error::InvalidInput("Passwords do not match".to_string()));
    }
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user_id = claims.user_id()?;
    let Some((user, hash)) = state.users.get_with_password_by_id(user_id).await? else {
        return Err(Error::NotFound("User".to_string()));
    };

    if !password::verify_password(&req.current_password, &hash)? {
        tracing::warn!(user_id = user.id, "Password change with incorrect current password");
        return Err(Error::InvalidCredentials);
    }

    let new_hash = password::hash_password(&req.new_password)?;
    state.users.update_password(user.id, &new_hash).await?;

    // Revoke existing sessions; the client must log in again
    state.sessions.delete_for_user(user.id).await?;

    let (client_ip, user_agent) = client_info(&headers);
    state
        .audit
        .record_best_effort(
            AuditEntry::new("auth.change_password")
                .user(user.id)
                .entity("user", user.id)
                .description("Password changed")
                .client(client_ip, user_agent),
        )
        .await;

    Ok(Json(ApiResponse::message("Password updated")))
}

// Helpers

fn require_field(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", name)));
    }
    Ok(())
}

fn client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let client_ip = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    (client_ip, user_agent)
}
