//! HTTP-level tests for account administration under `/users`.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, seed_admin,
    seed_coordinator, seed_operator, seed_user, token_for,
};
use serde_json::json;
use sqlx::PgPool;
use aerosamec_db::repositories::UserRepo;

fn new_user_body() -> serde_json::Value {
    json!({
        "email": "  Medica.Guardia@Salud.gob.ar ",
        "first_name": "  ana   MARÍA ",
        "last_name": "pérez",
        "dni": "32.456.789",
        "phone": " 011 4555  0000 ",
        "role": "OPERARIO",
        "function": "MEDICO"
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_account_with_temporary_password(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let token = token_for(&admin);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/users",
        new_user_body(),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["email"], "medica.guardia@salud.gob.ar");
    assert_eq!(data["first_name"], "Ana María");
    assert_eq!(data["last_name"], "Pérez");
    assert_eq!(data["dni"], "32456789");
    assert_eq!(data["phone"], "011 4555 0000");
    assert_eq!(data["password_temporary"], true);
    assert_eq!(data["email_verified"], false);
    // Log-only delivery counts as sent.
    assert_eq!(data["email_sent"], true);

    let stored = UserRepo::find_by_id(&pool, data["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.verification_token_hash.is_some());
    assert!(stored.verification_sent_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_or_dni_conflicts(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let token = token_for(&admin);

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/users",
        new_user_body(),
        &token,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let same_email = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/users",
        new_user_body(),
        &token,
    )
    .await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);

    let mut same_dni = new_user_body();
    same_dni["email"] = json!("otra@salud.gob.ar");
    let same_dni = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/users",
        same_dni,
        &token,
    )
    .await;
    assert_eq!(same_dni.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_input_is_rejected(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let token = token_for(&admin);

    let mut bad_email = new_user_body();
    bad_email["email"] = json!("no-es-un-email");
    let mut bad_role = new_user_body();
    bad_role["role"] = json!("SUPERVISOR");
    let mut bad_dni = new_user_body();
    bad_dni["dni"] = json!("abc");

    for body in [bad_email, bad_role, bad_dni] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/users",
            body,
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admins_cannot_manage_users(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let operator = seed_operator(&pool).await;

    for user in [&coordinator, &operator] {
        let response = get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/users",
            &token_for(user),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_changes_profile_but_keeps_dni_unique(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let operator = seed_operator(&pool).await;
    let token = token_for(&admin);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", operator.id),
        json!({ "role": "COORDINADOR", "function": "ENFERMERO", "last_name": "sosa díaz" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "COORDINADOR");
    assert_eq!(json["data"]["function"], "ENFERMERO");
    assert_eq!(json["data"]["last_name"], "Sosa Díaz");

    // The admin's DNI is taken.
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", operator.id),
        json!({ "dni": admin.dni }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Re-submitting your own DNI is fine.
    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/users/{}", operator.id),
        json!({ "dni": operator.dni }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_rules(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let primary = seed_user(&pool, common::PRIMARY_ADMIN_EMAIL, "10000001", "ADMIN").await;
    let operator = seed_operator(&pool).await;
    let token = token_for(&admin);

    let own = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", admin.id),
        &token,
    )
    .await;
    assert_eq!(own.status(), StatusCode::FORBIDDEN);

    let protected = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", primary.id),
        &token,
    )
    .await;
    assert_eq!(protected.status(), StatusCode::FORBIDDEN);

    let deleted = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", operator.id),
        &token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(UserRepo::find_by_id(&pool, operator.id).await.unwrap().is_none());

    let missing = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/users/{}", operator.id),
        &token,
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_referenced_by_transports_cannot_be_deleted(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let coordinator = seed_coordinator(&pool).await;
    common::create_transport(&pool, &token_for(&coordinator)).await;

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/users/{}", coordinator.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resend_verification_rules(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let token = token_for(&admin);

    let created = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/users",
        new_user_body(),
        &token,
    )
    .await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/users/{id}/resend-verification");

    // Just sent: cooldown applies.
    let response =
        post_json_auth(common::build_test_app(pool.clone()), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    sqlx::query("UPDATE users SET verification_sent_at = NOW() - INTERVAL '11 minutes' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    let before = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    let response =
        post_json_auth(common::build_test_app(pool.clone()), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_ne!(before.verification_token_hash, after.verification_token_hash);

    // Verified accounts have nothing to resend.
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/users/{}/resend-verification", admin.id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_cuts_off_existing_tokens(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let coordinator = seed_coordinator(&pool).await;
    let login = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": coordinator.email, "password": common::TEST_PASSWORD }),
    )
    .await;
    let login = body_json(login).await;
    let access = login["access_token"].as_str().unwrap().to_string();
    let refresh = login["refresh_token"].as_str().unwrap().to_string();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", coordinator.id),
        json!({ "is_active": false }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/transports",
        common::transport_body(),
        &access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND NOT is_revoked",
    )
    .bind(coordinator.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demotion_applies_to_existing_tokens(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", coordinator.id),
        json!({ "role": "OPERARIO" }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/transports",
        common::transport_body(),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_user_token_is_rejected(pool: PgPool) {
    let admin = seed_admin(&pool).await;
    let operator = seed_operator(&pool).await;
    let token = token_for(&operator);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", operator.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
