//! Shared helpers for the HTTP integration tests.
//!
//! Each test gets its own database from `#[sqlx::test]`; these helpers build
//! the production router on top of it and seed users directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use aerosamec_api::auth::jwt::{generate_access_token, JwtConfig};
use aerosamec_api::auth::password::hash_password;
use aerosamec_api::config::ServerConfig;
use aerosamec_api::router::build_app_router;
use aerosamec_api::state::AppState;
use aerosamec_db::models::user::{CreateUser, User};
use aerosamec_db::repositories::UserRepo;
use aerosamec_notify::Notifier;

/// Password of every seeded user.
pub const TEST_PASSWORD: &str = "clave-segura-123";

pub const PRIMARY_ADMIN_EMAIL: &str = "admin@salud.gob.ar";

/// Configuration with a fixed JWT secret and the dev CORS origin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_base_url: "http://localhost:5173".to_string(),
        primary_admin_email: PRIMARY_ADMIN_EMAIL.to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// The production router over `pool`, with log-only email.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let notifier = Notifier::log_only(&config.app_base_url);
    build_app_router(AppState {
        pool,
        config: Arc::new(config),
        notifier: Arc::new(notifier),
    })
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert an active, verified user with [`TEST_PASSWORD`].
pub async fn seed_user(pool: &PgPool, email: &str, dni: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        first_name: "Laura".to_string(),
        last_name: "Sosa".to_string(),
        dni: dni.to_string(),
        phone: None,
        role: role.to_string(),
        function: "MEDICO".to_string(),
        password_temporary: false,
        email_verified: true,
        verification_token_hash: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

pub async fn seed_admin(pool: &PgPool) -> User {
    seed_user(pool, "jefa@salud.gob.ar", "20111222", "ADMIN").await
}

pub async fn seed_coordinator(pool: &PgPool) -> User {
    seed_user(pool, "coordinacion@salud.gob.ar", "27333444", "COORDINADOR").await
}

pub async fn seed_operator(pool: &PgPool) -> User {
    seed_user(pool, "enfermeria@salud.gob.ar", "30555666", "OPERARIO").await
}

/// Access token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

/// A complete, valid body for `POST /transports`.
pub fn transport_body() -> Value {
    json!({
        "patient_first_name": "  tomás ",
        "patient_last_name": "RUIZ",
        "patient_dni": "50.123.456",
        "patient_birth_date": "2020-03-01",
        "patient_sex": "MASCULINO",
        "patient_weight_kg": 18.5,
        "has_coverage": false,
        "coverage_number": "OSDE-123",
        "requesting_institution": "hospital regional de río cuarto",
        "professional_name": "dra. vera",
        "professional_phone": "0358  555 0101",
        "request_reason": "Derivación a UCI pediátrica",
        "diagnoses": "Bronquiolitis grave",
        "triage_code": "ROJO",
        "complexity": "ALTA",
        "patient_category": "PEDIATRICO"
    })
}

/// Create a transport through the API and return its JSON.
pub async fn create_transport(pool: &PgPool, token: &str) -> Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/transports",
        transport_body(),
        token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
