//! HTTP API integration tests
//!
//! Endpoint tests drive the router directly against an in-memory SQLite
//! database. The spawned-server smoke test at the bottom exercises the
//! full network stack and is ignored by default:
//! cargo test -- --ignored --test-threads=1

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pitcrew::api::{create_router, AppState};
use pitcrew::auth::hash_password;
use pitcrew::auth::models::UserRole;
use pitcrew::config::{AuthConfig, Config};
use pitcrew::db::{self, settings::REGISTRATION_ENABLED, DbPool, NewUser};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt;

struct TestApp {
    state: AppState,
    router: Router,
    pool: DbPool,
}

async fn test_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::run_migrations(&pool).await.expect("Failed to migrate");

    let config = Config {
        auth: AuthConfig {
            jwt_secret: "api-test-secret".to_string(),
            token_ttl_secs: 3600,
        },
        ..Config::default()
    };

    let state = AppState::new(config, pool.clone());
    let router = create_router(state.clone());
    TestApp { state, router, pool }
}

impl TestApp {
    async fn seed_user(&self, email: &str, password: &str) -> i64 {
        let user = self
            .state
            .users
            .create(NewUser {
                email: email.to_string(),
                name: "Seeded User".to_string(),
                password_hash: hash_password(password).unwrap(),
                role: UserRole::Member,
            })
            .await
            .expect("Failed to seed user");
        user.id
    }

    async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn count(&self, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await.unwrap();
        row.0
    }
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_login_success() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (status, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert!(!body["data"]["session_id"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["user"]["email"], "a@b.com");

    // Login writes an audit entry
    assert_eq!(app.count("audit_log").await, 1);
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = test_app().await;
    app.seed_user("driver@team1234.org", "secret123").await;

    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "Driver@Team1234.ORG", "password": "secret123"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (wrong_pw_status, wrong_pw_body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "wrong-password"}),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "nobody@b.com", "password": "whatever1"}),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Same body for both: no user enumeration
    assert_eq!(wrong_pw_body, unknown_body);

    // No session or token was issued either way
    assert_eq!(app.count("sessions").await, 0);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let app = test_app().await;

    let (status, body) = app
        .post_json("/api/auth/login", json!({"email": "", "password": "x"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post_json("/api/auth/login", json!({"email": "a@b.com", "password": ""}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = test_app().await;

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            json!({
                "email": "New@Team1234.org",
                "password": "secret123",
                "confirm_password": "secret123",
                "name": "New Member"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "new@team1234.org");
    assert_eq!(body["data"]["user"]["role"], "member");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());

    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "new@team1234.org", "password": "secret123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_password_mismatch_writes_nothing() {
    let app = test_app().await;

    let (status, _) = app
        .post_json(
            "/api/auth/register",
            json!({
                "email": "new@team1234.org",
                "password": "secret123",
                "confirm_password": "different123",
                "name": "New Member"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("users").await, 0);
    assert_eq!(app.count("sessions").await, 0);
    assert_eq!(app.count("audit_log").await, 0);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = test_app().await;

    let (status, _) = app
        .post_json(
            "/api/auth/register",
            json!({
                "email": "new@team1234.org",
                "password": "short",
                "confirm_password": "short",
                "name": "New Member"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = test_app().await;
    app.seed_user("taken@team1234.org", "secret123").await;
    let sessions_before = app.count("sessions").await;

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            json!({
                "email": "taken@team1234.org",
                "password": "another-pass1",
                "confirm_password": "another-pass1",
                "name": "Impostor"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(app.count("sessions").await, sessions_before);
}

#[tokio::test]
async fn test_register_disabled_is_forbidden() {
    let app = test_app().await;
    app.state
        .settings
        .set(REGISTRATION_ENABLED, "false")
        .await
        .unwrap();

    let (status, _) = app
        .post_json(
            "/api/auth/register",
            json!({
                "email": "new@team1234.org",
                "password": "secret123",
                "confirm_password": "secret123",
                "name": "New Member"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn test_logout_revokes_session_and_is_idempotent() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (_, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    let logout = |session_id: String| {
        Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .header("X-Session-ID", session_id)
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = app.send(logout(session_id.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.sessions.get(&session_id).await.unwrap().is_none());

    // Logging out again, or without a header, still succeeds
    let (status, _) = app.send(logout(session_id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_user() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (_, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "a@b.com");
}

#[tokio::test]
async fn test_change_password_wrong_current() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (_, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth/change-password")
                .header("Authorization", format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "current_password": "not-my-password",
                        "new_password": "brand-new-pass1",
                        "confirm_password": "brand-new-pass1"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Stored hash unchanged: the old password still works
    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_success() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (_, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth/change-password")
                .header("Authorization", format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "current_password": "secret123",
                        "new_password": "brand-new-pass1",
                        "confirm_password": "brand-new-pass1"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Existing sessions are revoked
    assert!(app.state.sessions.get(&session_id).await.unwrap().is_none());

    // Old password no longer works, the new one does
    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "brand-new-pass1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_mismatched_confirmation() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    let (_, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth/change-password")
                .header("Authorization", format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "current_password": "secret123",
                        "new_password": "brand-new-pass1",
                        "confirm_password": "something-else1"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_login() {
    let app = test_app().await;
    app.seed_user("a@b.com", "secret123").await;

    // Break the audit table; login must still succeed
    sqlx::query("DROP TABLE audit_log")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app
        .post_json(
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "secret123"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
}

// Spawned-server smoke test

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_full_server_login_flow() {
    use pitcrew::api::run_server;
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("smoke.db");

    let mut config = Config {
        auth: AuthConfig {
            jwt_secret: "smoke-test-secret".to_string(),
            token_ttl_secs: 3600,
        },
        ..Config::default()
    };
    config.database.url = format!("sqlite://{}", db_path.display());

    let port = 4311u16;
    let server = tokio::spawn(async move {
        let _ = run_server(config, "127.0.0.1", port).await;
    });

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    // Wait for the server to come up
    let mut ready = false;
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{}/api/health", base)).send().await {
            if resp.status().is_success() {
                ready = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(ready, "Server failed to start");

    let resp = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({
            "email": "smoke@team1234.org",
            "password": "secret123",
            "confirm_password": "secret123",
            "name": "Smoke Test"
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({"email": "smoke@team1234.org", "password": "secret123"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());

    server.abort();
}
