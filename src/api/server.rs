//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, SessionStore};
use crate::config::Config;
use crate::db::{self, AuditLog, DbPool, SettingsRepository, UserRepository};
use crate::error::Result;

use super::routes;

/// Application state shared across handlers.
///
/// Built once at startup; every collaborator is injected here rather
/// than constructed inside handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: UserRepository,
    pub sessions: SessionStore,
    pub settings: SettingsRepository,
    pub audit: AuditLog,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool) -> Self {
        Self {
            config: Arc::new(config),
            users: UserRepository::new(pool.clone()),
            sessions: SessionStore::new(pool.clone()),
            settings: SettingsRepository::new(pool.clone()),
            audit: AuditLog::new(pool),
        }
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    config.auth.validate()?;

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(config, pool);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(routes::me))
        .route("/api/auth/change-password", post(routes::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/register", post(routes::register))
        .route("/api/auth/logout", post(routes::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
