//! Handlers for `/hospitals`.
//!
//! Any authenticated user can read the catalogue; only admins change it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use aerosamec_core::codes::{parse_optional, HospitalKind};
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::{
    capitalize_name, clean_text, format_email, format_institution, format_phone, non_blank,
};
use aerosamec_core::types::DbId;
use aerosamec_db::models::hospital::{CreateHospital, Hospital, UpdateHospital};
use aerosamec_db::repositories::HospitalRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/hospitals
pub async fn list_hospitals(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Hospital>>>> {
    let hospitals = HospitalRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: hospitals }))
}

/// GET /api/v1/hospitals/{id}
pub async fn get_hospital(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Hospital>>> {
    let hospital = HospitalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hospital",
            id,
        }))?;
    Ok(Json(DataResponse { data: hospital }))
}

/// POST /api/v1/hospitals
pub async fn create_hospital(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHospital>,
) -> AppResult<(StatusCode, Json<DataResponse<Hospital>>)> {
    let kind = parse_optional::<HospitalKind>(input.kind.as_deref())?;

    let normalized = CreateHospital {
        name: required(format_institution(&input.name), "name")?,
        address: required(clean_text(&input.address), "address")?,
        city: required(capitalize_name(&input.city), "city")?,
        province: required(capitalize_name(&input.province), "province")?,
        phone: non_blank(input.phone.as_deref()).map(format_phone),
        email: non_blank(input.email.as_deref()).map(format_email),
        kind: kind.map(|k| k.as_str().to_string()),
    };

    let hospital = HospitalRepo::create(&state.pool, &normalized).await?;
    tracing::info!(hospital_id = hospital.id, created_by = admin.user_id, "Hospital created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: hospital })))
}

/// PUT /api/v1/hospitals/{id}
pub async fn update_hospital(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHospital>,
) -> AppResult<Json<DataResponse<Hospital>>> {
    let kind = parse_optional::<HospitalKind>(input.kind.as_deref())?;

    let normalized = UpdateHospital {
        name: input
            .name
            .map(|v| required(format_institution(&v), "name"))
            .transpose()?,
        address: input
            .address
            .map(|v| required(clean_text(&v), "address"))
            .transpose()?,
        city: input
            .city
            .map(|v| required(capitalize_name(&v), "city"))
            .transpose()?,
        province: input
            .province
            .map(|v| required(capitalize_name(&v), "province"))
            .transpose()?,
        phone: non_blank(input.phone.as_deref()).map(format_phone),
        email: non_blank(input.email.as_deref()).map(format_email),
        kind: kind.map(|k| k.as_str().to_string()),
        is_active: input.is_active,
    };

    let hospital = HospitalRepo::update(&state.pool, id, &normalized)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hospital",
            id,
        }))?;

    tracing::info!(hospital_id = id, updated_by = admin.user_id, "Hospital updated");
    Ok(Json(DataResponse { data: hospital }))
}

fn required(value: String, field: &str) -> AppResult<String> {
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Hospital {field} is required"
        ))));
    }
    Ok(value)
}
