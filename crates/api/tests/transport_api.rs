//! HTTP-level tests for transport requests: creation, listing, edits,
//! status changes, team assignment and deletion.

mod common;

use aerosamec_db::repositories::TrackingRepo;
use axum::http::StatusCode;
use chrono::{Datelike, NaiveDate, Utc};
use common::{
    body_json, create_transport, delete_auth, get_auth, post_json_auth, put_json_auth,
    seed_coordinator, seed_operator, token_for, transport_body,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn set_status(pool: &PgPool, id: i64, status: &str, token: &str) -> axum::response::Response {
    put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{id}/status"),
        json!({ "status": status }),
        token,
    )
    .await
}

fn ids(json: &Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_normalizes_and_numbers_the_request(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let transport = create_transport(&pool, &token_for(&coordinator)).await;

    let number = transport["transport_number"].as_str().unwrap();
    assert!(number.starts_with(&format!("TRA-{}-", Utc::now().year())));
    assert_eq!(number.len(), "TRA-2025-1234".len());

    assert_eq!(transport["status"], "SOLICITADO");
    assert_eq!(transport["priority"], "NORMAL");
    assert_eq!(transport["patient_first_name"], "Tomás");
    assert_eq!(transport["patient_last_name"], "Ruiz");
    assert_eq!(transport["patient_dni"], "50123456");
    assert_eq!(transport["requesting_institution"], "Hospital Regional de Río Cuarto");
    assert_eq!(transport["professional_name"], "Dra. Vera");
    assert_eq!(transport["professional_phone"], "0358 555 0101");
    assert_eq!(transport["created_by"], coordinator.id);
    // Not covered, so the coverage number is dropped.
    assert_eq!(transport["has_coverage"], false);
    assert!(transport["coverage_number"].is_null());

    let birth = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let days = (Utc::now().date_naive() - birth).num_days();
    assert_eq!(transport["patient_age_years"], days / 365);
    assert_eq!(transport["patient_age_days"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn covered_patient_keeps_coverage_number(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let mut body = transport_body();
    body["has_coverage"] = json!(true);
    body["priority"] = json!("URGENTE");

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/transports",
        body,
        &token_for(&coordinator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["coverage_number"], "OSDE-123");
    assert_eq!(json["data"]["priority"], "URGENTE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_requests_are_rejected(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);

    let mut blank_diagnoses = transport_body();
    blank_diagnoses["diagnoses"] = json!("   ");
    let mut future_birth = transport_body();
    future_birth["patient_birth_date"] = json!("2999-01-01");
    let mut bad_triage = transport_body();
    bad_triage["triage_code"] = json!("NARANJA");
    let mut missing_hospital = transport_body();
    missing_hospital["origin_hospital_id"] = json!(999_999);
    let mut negative_weight = transport_body();
    negative_weight["patient_weight_kg"] = json!(-3.0);

    for body in [blank_diagnoses, future_birth, bad_triage, missing_hospital, negative_weight] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/transports",
            body,
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn operators_cannot_create_transports(pool: PgPool) {
    let operator = seed_operator(&pool).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/transports",
        transport_body(),
        &token_for(&operator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_is_newest_first_and_filterable(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);
    let first = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let second = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    set_status(&pool, first, "ASIGNADO", &token).await;

    let all = body_json(
        get_auth(common::build_test_app(pool.clone()), "/api/v1/transports", &token).await,
    )
    .await;
    assert_eq!(ids(&all), vec![second, first]);
    assert_eq!(all["data"][0]["created_by_name"], "Laura Sosa");

    let assigned = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/transports?status=ASIGNADO",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(ids(&assigned), vec![first]);

    let paged = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/transports?limit=1&offset=1",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(ids(&paged), vec![first]);

    let invalid = get_auth(
        common::build_test_app(pool),
        "/api/v1/transports?status=VOLANDO",
        &token,
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn operator_board_shows_active_transports(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let operator = seed_operator(&pool).await;
    let token = token_for(&coordinator);

    let requested = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let flying = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let mine = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let done = create_transport(&pool, &token).await["id"].as_i64().unwrap();

    set_status(&pool, flying, "EN_CURSO", &token).await;
    set_status(&pool, mine, "EN_PREPARACION", &token).await;
    set_status(&pool, done, "COMPLETADO", &token).await;
    put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{mine}/team"),
        json!({ "assigned_user_id": operator.id }),
        &token,
    )
    .await;

    let operator_token = token_for(&operator);
    let board = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/transports/active",
            &operator_token,
        )
        .await,
    )
    .await;
    let board_ids = ids(&board);
    assert!(board_ids.contains(&flying));
    assert!(board_ids.contains(&mine));
    assert!(!board_ids.contains(&requested));
    assert!(!board_ids.contains(&done));

    let own = body_json(
        get_auth(
            common::build_test_app(pool),
            "/api/v1/transports/active?mine=true",
            &operator_token,
        )
        .await,
    )
    .await;
    assert_eq!(ids(&own), vec![mine]);
    assert_eq!(own["data"][0]["assigned_user_name"], "Laura Sosa");
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_changes_are_free_and_tracked(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let operator = seed_operator(&pool).await;
    let id = create_transport(&pool, &token_for(&coordinator)).await["id"]
        .as_i64()
        .unwrap();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{id}/status"),
        json!({ "status": "EN_CURSO", "observations": "Despegue 14:05" }),
        &token_for(&operator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "EN_CURSO");

    // Moving backwards is allowed.
    let response = set_status(&pool, id, "ASIGNADO", &token_for(&operator)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries = TrackingRepo::list_for_transport(&pool, id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, "CAMBIO_ESTADO");
    assert_eq!(entries[0].description, "Estado cambiado a: EN_CURSO");
    assert_eq!(
        entries[0].observations.as_deref(),
        Some("Estado anterior: SOLICITADO. Despegue 14:05")
    );
    assert_eq!(entries[0].user_id, operator.id);
    assert_eq!(entries[1].observations.as_deref(), Some("Estado anterior: EN_CURSO"));

    let invalid = set_status(&pool, id, "PERDIDO", &token_for(&operator)).await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let missing = set_status(&pool, 999_999, "ASIGNADO", &token_for(&operator)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn edit_recomputes_age_and_is_tracked(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);
    let id = create_transport(&pool, &token).await["id"].as_i64().unwrap();

    let birth = Utc::now().date_naive() - chrono::Duration::days(45);
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{id}"),
        json!({
            "patient_birth_date": birth,
            "patient_category": "NEONATAL",
            "has_coverage": true,
            "coverage_number": "PAMI 998877"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["patient_age_years"], 0);
    assert_eq!(json["data"]["patient_age_months"], 1);
    assert_eq!(json["data"]["patient_age_days"], 15);
    assert_eq!(json["data"]["patient_category"], "NEONATAL");
    assert_eq!(json["data"]["coverage_number"], "PAMI 998877");
    // Untouched fields survive.
    assert_eq!(json["data"]["diagnoses"], "Bronquiolitis grave");

    let entries = TrackingRepo::list_for_transport(&pool, id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "OBSERVACION_MEDICA");
    assert_eq!(entries[0].description, "Traslado editado");

    let blanked = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/transports/{id}"),
        json!({ "patient_first_name": "  " }),
        &token,
    )
    .await;
    assert_eq!(blanked.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn team_assignment_only_changes_given_fields(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);
    let id = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/transports/{id}/team");

    put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "doctor_name": "dra. pérez", "aircraft_registration": " lv-abc " }),
        &token,
    )
    .await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "pilot_name": "cap. gómez" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["doctor_name"], "Dra. Pérez");
    assert_eq!(json["data"]["pilot_name"], "Cap. Gómez");
    assert_eq!(json["data"]["aircraft_registration"], "LV-ABC");
    assert!(json["data"]["nurse_name"].is_null());

    let entries = TrackingRepo::list_for_transport(&pool, id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].kind, "EVENTO_TECNICO");
    assert_eq!(entries[1].description, "Equipo médico asignado");
    assert_eq!(
        entries[1].observations.as_deref(),
        Some("Médico: Dra. Pérez, Enfermero: No asignado, Piloto: Cap. Gómez, Aeronave: LV-ABC")
    );

    let unknown_user = put_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "assigned_user_id": 999_999 }),
        &token,
    )
    .await;
    assert_eq!(unknown_user.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn crews_write_the_epicrisis(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let operator = seed_operator(&pool).await;
    let id = create_transport(&pool, &token_for(&coordinator)).await["id"]
        .as_i64()
        .unwrap();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{id}/epicrisis"),
        json!({ "epicrisis": "Paciente estable al arribo." }),
        &token_for(&operator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["epicrisis"],
        "Paciente estable al arribo."
    );

    let entries = TrackingRepo::list_for_transport(&pool, id).await.unwrap();
    assert_eq!(entries[0].description, "Epicrisis actualizada");

    // Markup and control characters are stripped like any clinical note.
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/transports/{id}/epicrisis"),
        json!({ "epicrisis": "<b>Arribo</b> sin\u{7} novedades" }),
        &token_for(&operator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["epicrisis"], "Arribo sin novedades");

    for blank in [" ", "<script></script>"] {
        let empty = put_json_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/transports/{id}/epicrisis"),
            json!({ "epicrisis": blank }),
            &token_for(&operator),
        )
        .await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flying_and_completed_transports_cannot_be_deleted(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let token = token_for(&coordinator);
    let id = create_transport(&pool, &token).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/transports/{id}");

    for status in ["EN_CURSO", "COMPLETADO"] {
        set_status(&pool, id, status, &token).await;
        let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    set_status(&pool, id, "CANCELADO", &token).await;
    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Tracking went with it.
    assert!(TrackingRepo::list_for_transport(&pool, id).await.unwrap().is_empty());
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn operators_cannot_delete(pool: PgPool) {
    let coordinator = seed_coordinator(&pool).await;
    let operator = seed_operator(&pool).await;
    let id = create_transport(&pool, &token_for(&coordinator)).await["id"]
        .as_i64()
        .unwrap();

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/transports/{id}"),
        &token_for(&operator),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
