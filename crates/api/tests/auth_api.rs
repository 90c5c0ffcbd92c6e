//! HTTP-level tests for login, refresh, logout and `me`.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, seed_coordinator, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;
use aerosamec_db::repositories::UserRepo;

async fn login(pool: &PgPool, email: &str, password: &str) -> axum::response::Response {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_profile(pool: PgPool) {
    let user = seed_coordinator(&pool).await;

    // Email matching ignores case and surrounding whitespace.
    let response = login(&pool, "  Coordinacion@Salud.gob.ar ", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "COORDINADOR");
    assert_eq!(json["user"]["password_temporary"], false);
    assert!(json["user"].get("password_hash").is_none());

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_matches!(stored.last_login_at, Some(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    seed_coordinator(&pool).await;

    let wrong = login(&pool, "coordinacion@salud.gob.ar", "incorrecta").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong = body_json(wrong).await;

    let unknown = login(&pool, "nadie@salud.gob.ar", "incorrecta").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown = body_json(unknown).await;

    assert_eq!(wrong["error"], unknown["error"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn five_failures_lock_the_account(pool: PgPool) {
    let user = seed_coordinator(&pool).await;

    for _ in 0..5 {
        let response = login(&pool, &user.email, "incorrecta").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = login(&pool, &user.email, TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_count, 5);
    assert_matches!(stored.locked_until, Some(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_lock_restarts_the_failure_count(pool: PgPool) {
    let user = seed_coordinator(&pool).await;
    for _ in 0..5 {
        login(&pool, &user.email, "incorrecta").await;
    }
    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    // A single typo after the lock expires does not lock again.
    let response = login(&pool, &user.email, "incorrecta").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_count, 1);
    assert_eq!(stored.locked_until, None);

    let response = login(&pool, &user.email, TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_account_cannot_log_in(pool: PgPool) {
    let user = seed_coordinator(&pool).await;
    let deactivate = aerosamec_db::models::user::UpdateUser {
        is_active: Some(false),
        ..Default::default()
    };
    UserRepo::update(&pool, user.id, &deactivate).await.unwrap();

    let response = login(&pool, &user.email, TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let user = seed_coordinator(&pool).await;
    let json = body_json(login(&pool, &user.email, TEST_PASSWORD).await).await;
    let original = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": original }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), original);

    // The old token is single-use.
    let replay = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": original }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    let user = seed_coordinator(&pool).await;
    let json = body_json(login(&pool, &user.email, TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        json!({}),
        access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_the_caller(pool: PgPool) {
    let user = seed_coordinator(&pool).await;
    let token = common::token_for(&user);

    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "coordinacion@salud.gob.ar");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
