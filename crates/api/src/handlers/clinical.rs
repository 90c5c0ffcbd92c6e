//! Handlers for the clinical record of a transport: procedures,
//! medications and vital signs.
//!
//! Records are append-only. Each one is written together with the tracking
//! entry announcing it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use aerosamec_core::clinical::VitalSigns;
use aerosamec_core::codes::MedicationRoute;
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::{
    format_medication, sanitize_text, upper_clean, MAX_CLINICAL_TEXT_LEN,
};
use aerosamec_core::tracking;
use aerosamec_core::types::{DbId, Timestamp};
use aerosamec_db::models::clinical::{
    CreateMedication, CreateProcedure, CreateVitalSignReading, Medication, Procedure,
    VitalSignReading,
};
use aerosamec_db::models::tracking::CreateTrackingEntry;
use aerosamec_db::repositories::ClinicalRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::transports::require_transport;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /transports/{id}/procedures`.
#[derive(Debug, Deserialize)]
pub struct CreateProcedureRequest {
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
    pub recorded_at: Option<Timestamp>,
}

/// Request body for `POST /transports/{id}/medications`.
#[derive(Debug, Deserialize)]
pub struct CreateMedicationRequest {
    pub drug: String,
    pub dose: String,
    pub route: String,
    pub observations: Option<String>,
    pub recorded_at: Option<Timestamp>,
}

/// Request body for `POST /transports/{id}/vital-signs`.
#[derive(Debug, Deserialize)]
pub struct CreateVitalSignsRequest {
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i32>,
    pub glasgow: Option<i32>,
    pub observations: Option<String>,
    pub recorded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Procedures
// ---------------------------------------------------------------------------

/// GET /api/v1/transports/{id}/procedures
pub async fn list_procedures(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Procedure>>>> {
    require_transport(&state, id).await?;
    let procedures = ClinicalRepo::list_procedures(&state.pool, id).await?;
    Ok(Json(DataResponse { data: procedures }))
}

/// POST /api/v1/transports/{id}/procedures
///
/// Kind, description and observations are stored upper-case.
pub async fn create_procedure(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateProcedureRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Procedure>>)> {
    require_transport(&state, id).await?;

    let kind = required("kind", upper_clean(&input.kind))?;
    let description = required("description", upper_clean(&input.description))?;
    let observations = clinical_text(input.observations.as_deref()).map(|v| v.to_uppercase());

    let note = CreateTrackingEntry::from_note(
        id,
        auth.user_id,
        tracking::procedure_recorded(&kind, &description),
    );
    let procedure = ClinicalRepo::create_procedure(
        &state.pool,
        &CreateProcedure {
            transport_id: id,
            user_id: auth.user_id,
            kind,
            description,
            observations,
            recorded_at: input.recorded_at,
        },
        &note,
    )
    .await?;

    tracing::info!(
        transport_id = id,
        procedure_id = procedure.id,
        kind = %procedure.kind,
        user_id = auth.user_id,
        "Procedure recorded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: procedure })))
}

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

/// GET /api/v1/transports/{id}/medications
pub async fn list_medications(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Medication>>>> {
    require_transport(&state, id).await?;
    let medications = ClinicalRepo::list_medications(&state.pool, id).await?;
    Ok(Json(DataResponse { data: medications }))
}

/// POST /api/v1/transports/{id}/medications
pub async fn create_medication(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateMedicationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Medication>>)> {
    require_transport(&state, id).await?;

    let drug = format_medication(&input.drug)
        .ok_or_else(|| AppError::Core(CoreError::Validation("drug is required".into())))?;
    let dose = clinical_text(Some(input.dose.as_str()))
        .ok_or_else(|| AppError::Core(CoreError::Validation("dose is required".into())))?;
    let route: MedicationRoute = input.route.trim().parse()?;

    let note = CreateTrackingEntry::from_note(
        id,
        auth.user_id,
        tracking::medication_recorded(&drug, &dose, route.as_str()),
    );
    let medication = ClinicalRepo::create_medication(
        &state.pool,
        &CreateMedication {
            transport_id: id,
            user_id: auth.user_id,
            drug,
            dose,
            route: route.as_str().to_string(),
            observations: clinical_text(input.observations.as_deref()),
            recorded_at: input.recorded_at,
        },
        &note,
    )
    .await?;

    tracing::info!(
        transport_id = id,
        medication_id = medication.id,
        drug = %medication.drug,
        user_id = auth.user_id,
        "Medication recorded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: medication })))
}

// ---------------------------------------------------------------------------
// Vital signs
// ---------------------------------------------------------------------------

/// GET /api/v1/transports/{id}/vital-signs
pub async fn list_vital_signs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<VitalSignReading>>>> {
    require_transport(&state, id).await?;
    let readings = ClinicalRepo::list_vital_signs(&state.pool, id).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// POST /api/v1/transports/{id}/vital-signs
///
/// At least one measurement is required and each must be plausible.
pub async fn create_vital_signs(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateVitalSignsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<VitalSignReading>>)> {
    let signs = VitalSigns {
        heart_rate: input.heart_rate,
        respiratory_rate: input.respiratory_rate,
        systolic_bp: input.systolic_bp,
        diastolic_bp: input.diastolic_bp,
        temperature_c: input.temperature_c,
        spo2: input.spo2,
        glasgow: input.glasgow,
    };
    signs.validate()?;
    require_transport(&state, id).await?;

    let note =
        CreateTrackingEntry::from_note(id, auth.user_id, tracking::vital_signs_recorded(&signs));
    let reading = ClinicalRepo::create_vital_signs(
        &state.pool,
        &CreateVitalSignReading {
            transport_id: id,
            user_id: auth.user_id,
            heart_rate: signs.heart_rate,
            respiratory_rate: signs.respiratory_rate,
            systolic_bp: signs.systolic_bp,
            diastolic_bp: signs.diastolic_bp,
            temperature_c: signs.temperature_c,
            spo2: signs.spo2,
            glasgow: signs.glasgow,
            observations: clinical_text(input.observations.as_deref()),
            recorded_at: input.recorded_at,
        },
        &note,
    )
    .await?;

    tracing::info!(
        transport_id = id,
        reading_id = reading.id,
        user_id = auth.user_id,
        "Vital signs recorded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: reading })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clinical_text(raw: Option<&str>) -> Option<String> {
    raw.and_then(|v| sanitize_text(v, MAX_CLINICAL_TEXT_LEN))
}

fn required(field: &str, value: String) -> AppResult<String> {
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} is required"
        ))));
    }
    Ok(value)
}
