//! Handlers for `/transports`.
//!
//! Coordinators and admins create, edit, staff and delete requests. Every
//! authenticated user can read them, move their status and write the
//! epicrisis, since crews do both from the aircraft.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use aerosamec_core::age::compute_age;
use aerosamec_core::codes::{
    parse_optional, Complexity, PatientCategory, Priority, Sex, TriageCode,
};
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::{
    capitalize_name, clean_text, format_dni, format_institution, format_phone, non_blank,
    sanitize_text, upper_clean, MAX_CLINICAL_TEXT_LEN, MAX_EPICRISIS_LEN,
};
use aerosamec_core::tracking;
use aerosamec_core::transport::{random_transport_number, TransportStatus, MAX_NUMBER_ATTEMPTS};
use aerosamec_core::types::{DbId, Timestamp};
use aerosamec_db::models::clinical::{Medication, Procedure, VitalSignReading};
use aerosamec_db::models::tracking::{CreateTrackingEntry, TrackingEntry};
use aerosamec_db::models::transport::{
    CreateTransport, StoredAge, TeamAssignment, TransportListItem, TransportQuery,
    TransportRequest, UpdateTransport,
};
use aerosamec_db::repositories::{
    ClinicalRepo, HospitalRepo, TrackingRepo, TransportRepo, UserRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCoordinator;
use crate::query::{ActiveTransportParams, TransportListParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /transports`.
#[derive(Debug, Deserialize)]
pub struct CreateTransportRequest {
    pub transport_date: Option<Timestamp>,

    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_dni: String,
    pub patient_birth_date: NaiveDate,
    pub patient_sex: String,
    pub patient_weight_kg: Option<f64>,
    pub patient_height_cm: Option<f64>,
    pub patient_address: Option<String>,
    pub patient_locality: Option<String>,
    #[serde(default)]
    pub has_coverage: bool,
    pub coverage_number: Option<String>,

    pub requesting_institution: String,
    pub professional_name: String,
    pub professional_phone: String,
    pub request_reason: String,
    pub diagnoses: String,
    pub triage_code: String,

    pub complexity: Option<String>,
    pub patient_category: Option<String>,
    pub priority: Option<String>,
    pub observations: Option<String>,

    pub origin_hospital_id: Option<DbId>,
    pub destination_hospital_id: Option<DbId>,
}

/// Request body for `PUT /transports/{id}`. Absent fields are left as is.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransportRequest {
    pub transport_date: Option<Timestamp>,

    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_dni: Option<String>,
    pub patient_birth_date: Option<NaiveDate>,
    pub patient_sex: Option<String>,
    pub patient_weight_kg: Option<f64>,
    pub patient_height_cm: Option<f64>,
    pub patient_address: Option<String>,
    pub patient_locality: Option<String>,
    pub has_coverage: Option<bool>,
    pub coverage_number: Option<String>,

    pub requesting_institution: Option<String>,
    pub professional_name: Option<String>,
    pub professional_phone: Option<String>,
    pub request_reason: Option<String>,
    pub diagnoses: Option<String>,
    pub triage_code: Option<String>,

    pub complexity: Option<String>,
    pub patient_category: Option<String>,
    pub priority: Option<String>,
    pub observations: Option<String>,

    pub origin_hospital_id: Option<DbId>,
    pub destination_hospital_id: Option<DbId>,
}

/// Request body for `PUT /transports/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    /// Appended to the tracking entry.
    pub observations: Option<String>,
}

/// Request body for `PUT /transports/{id}/team`. Absent fields are left as is.
#[derive(Debug, Default, Deserialize)]
pub struct TeamAssignmentRequest {
    pub departure_time: Option<Timestamp>,
    pub doctor_name: Option<String>,
    pub nurse_name: Option<String>,
    pub pilot_name: Option<String>,
    pub aircraft_registration: Option<String>,
    pub assigned_user_id: Option<DbId>,
}

/// Request body for `PUT /transports/{id}/epicrisis`.
#[derive(Debug, Deserialize)]
pub struct EpicrisisRequest {
    pub epicrisis: String,
}

/// A transport with its full clinical record and tracking log.
#[derive(Debug, Serialize)]
pub struct TransportDetail {
    #[serde(flatten)]
    pub transport: TransportListItem,
    pub procedures: Vec<Procedure>,
    pub medications: Vec<Medication>,
    pub vital_signs: Vec<VitalSignReading>,
    pub tracking: Vec<TrackingEntry>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/transports?status=&limit=&offset=
pub async fn list_transports(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TransportListParams>,
) -> AppResult<Json<DataResponse<Vec<TransportListItem>>>> {
    let status = parse_optional::<TransportStatus>(non_blank(params.status.as_deref()))?;
    let query = TransportQuery {
        status: status.map(|s| s.as_str().to_string()),
        limit: params.limit,
        offset: params.offset,
    };
    let transports = TransportRepo::list(&state.pool, &query).await?;
    Ok(Json(DataResponse { data: transports }))
}

/// GET /api/v1/transports/active?mine=
///
/// The operator board: assigned, preparing and in-flight transports.
pub async fn list_active_transports(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ActiveTransportParams>,
) -> AppResult<Json<DataResponse<Vec<TransportListItem>>>> {
    let statuses: Vec<String> = TransportStatus::OPERATOR_VISIBLE
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    let assigned_to = params.mine.then_some(auth.user_id);

    let transports = TransportRepo::list_by_statuses(&state.pool, &statuses, assigned_to).await?;
    Ok(Json(DataResponse { data: transports }))
}

/// GET /api/v1/transports/{id}
pub async fn get_transport(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TransportDetail>>> {
    let transport = TransportRepo::find_list_item(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;

    let procedures = ClinicalRepo::list_procedures(&state.pool, id).await?;
    let medications = ClinicalRepo::list_medications(&state.pool, id).await?;
    let vital_signs = ClinicalRepo::list_vital_signs(&state.pool, id).await?;
    let tracking = TrackingRepo::list_for_transport(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: TransportDetail {
            transport,
            procedures,
            medications,
            vital_signs,
            tracking,
        },
    }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/transports
///
/// Register a new request in status `SOLICITADO` under a freshly drawn
/// transport number.
pub async fn create_transport(
    RequireCoordinator(user): RequireCoordinator,
    State(state): State<AppState>,
    Json(input): Json<CreateTransportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TransportRequest>>)> {
    let sex: Sex = input.patient_sex.parse()?;
    let triage: TriageCode = input.triage_code.parse()?;
    let complexity = parse_optional::<Complexity>(non_blank(input.complexity.as_deref()))?;
    let category = parse_optional::<PatientCategory>(non_blank(input.patient_category.as_deref()))?;
    let priority = parse_optional::<Priority>(non_blank(input.priority.as_deref()))?
        .unwrap_or_default();

    let age = compute_age(input.patient_birth_date, Utc::now().date_naive())?;
    check_measurement("patient_weight_kg", input.patient_weight_kg)?;
    check_measurement("patient_height_cm", input.patient_height_cm)?;
    check_hospital(&state, input.origin_hospital_id).await?;
    check_hospital(&state, input.destination_hospital_id).await?;

    let coverage_number = if input.has_coverage {
        non_blank(input.coverage_number.as_deref()).map(clean_text)
    } else {
        None
    };

    let transport_number = allocate_transport_number(&state).await?;

    let create = CreateTransport {
        transport_number,
        transport_date: input.transport_date,

        patient_first_name: required("patient_first_name", capitalize_name(&input.patient_first_name))?,
        patient_last_name: required("patient_last_name", capitalize_name(&input.patient_last_name))?,
        patient_dni: required("patient_dni", format_dni(&input.patient_dni))?,
        patient_birth_date: input.patient_birth_date,
        patient_age: StoredAge::from(age),
        patient_sex: sex.as_str().to_string(),
        patient_weight_kg: input.patient_weight_kg,
        patient_height_cm: input.patient_height_cm,
        patient_address: non_blank(input.patient_address.as_deref()).map(clean_text),
        patient_locality: non_blank(input.patient_locality.as_deref()).map(capitalize_name),
        has_coverage: input.has_coverage,
        coverage_number,

        requesting_institution: required(
            "requesting_institution",
            format_institution(&input.requesting_institution),
        )?,
        professional_name: required("professional_name", capitalize_name(&input.professional_name))?,
        professional_phone: required("professional_phone", format_phone(&input.professional_phone))?,
        request_reason: required("request_reason", clean_text(&input.request_reason))?,
        diagnoses: required("diagnoses", clean_text(&input.diagnoses))?,
        triage_code: triage.as_str().to_string(),

        complexity: complexity.map(|c| c.as_str().to_string()),
        patient_category: category.map(|c| c.as_str().to_string()),
        priority: priority.as_str().to_string(),
        observations: input
            .observations
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_CLINICAL_TEXT_LEN)),

        origin_hospital_id: input.origin_hospital_id,
        destination_hospital_id: input.destination_hospital_id,
        created_by: user.user_id,
    };

    let transport = TransportRepo::create(&state.pool, &create).await?;
    tracing::info!(
        transport_id = transport.id,
        transport_number = %transport.transport_number,
        triage = %transport.triage_code,
        created_by = user.user_id,
        "Transport requested",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: transport })))
}

/// PUT /api/v1/transports/{id}
///
/// Partial edit. Changing the birth date recomputes the stored age.
pub async fn update_transport(
    RequireCoordinator(user): RequireCoordinator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTransportRequest>,
) -> AppResult<Json<DataResponse<TransportRequest>>> {
    let sex = parse_optional::<Sex>(input.patient_sex.as_deref())?;
    let triage = parse_optional::<TriageCode>(input.triage_code.as_deref())?;
    let complexity = parse_optional::<Complexity>(non_blank(input.complexity.as_deref()))?;
    let category = parse_optional::<PatientCategory>(non_blank(input.patient_category.as_deref()))?;
    let priority = parse_optional::<Priority>(non_blank(input.priority.as_deref()))?;

    let patient_age = input
        .patient_birth_date
        .map(|birth| compute_age(birth, Utc::now().date_naive()).map(StoredAge::from))
        .transpose()?;
    check_measurement("patient_weight_kg", input.patient_weight_kg)?;
    check_measurement("patient_height_cm", input.patient_height_cm)?;
    check_hospital(&state, input.origin_hospital_id).await?;
    check_hospital(&state, input.destination_hospital_id).await?;

    let update = UpdateTransport {
        transport_date: input.transport_date,

        patient_first_name: optional_required(
            "patient_first_name",
            input.patient_first_name.as_deref().map(capitalize_name),
        )?,
        patient_last_name: optional_required(
            "patient_last_name",
            input.patient_last_name.as_deref().map(capitalize_name),
        )?,
        patient_dni: optional_required("patient_dni", input.patient_dni.as_deref().map(format_dni))?,
        patient_birth_date: input.patient_birth_date,
        patient_age,
        patient_sex: sex.map(|s| s.as_str().to_string()),
        patient_weight_kg: input.patient_weight_kg,
        patient_height_cm: input.patient_height_cm,
        patient_address: non_blank(input.patient_address.as_deref()).map(clean_text),
        patient_locality: non_blank(input.patient_locality.as_deref()).map(capitalize_name),
        has_coverage: input.has_coverage,
        coverage_number: non_blank(input.coverage_number.as_deref()).map(clean_text),

        requesting_institution: optional_required(
            "requesting_institution",
            input.requesting_institution.as_deref().map(format_institution),
        )?,
        professional_name: optional_required(
            "professional_name",
            input.professional_name.as_deref().map(capitalize_name),
        )?,
        professional_phone: optional_required(
            "professional_phone",
            input.professional_phone.as_deref().map(format_phone),
        )?,
        request_reason: optional_required(
            "request_reason",
            input.request_reason.as_deref().map(clean_text),
        )?,
        diagnoses: optional_required("diagnoses", input.diagnoses.as_deref().map(clean_text))?,
        triage_code: triage.map(|t| t.as_str().to_string()),

        complexity: complexity.map(|c| c.as_str().to_string()),
        patient_category: category.map(|c| c.as_str().to_string()),
        priority: priority.map(|p| p.as_str().to_string()),
        observations: input
            .observations
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_CLINICAL_TEXT_LEN)),

        origin_hospital_id: input.origin_hospital_id,
        destination_hospital_id: input.destination_hospital_id,
    };

    let note = CreateTrackingEntry::from_note(id, user.user_id, tracking::transport_edited());
    let transport = TransportRepo::update(&state.pool, id, &update, &note)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(transport_id = id, updated_by = user.user_id, "Transport edited");
    Ok(Json(DataResponse { data: transport }))
}

/// PUT /api/v1/transports/{id}/status
///
/// Any status may follow any other; moves against the nominal progression
/// are logged but allowed.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusChangeRequest>,
) -> AppResult<Json<DataResponse<TransportRequest>>> {
    let next: TransportStatus = input.status.parse()?;
    let current = require_transport(&state, id).await?;
    let previous = stored_status(&current)?;

    if previous.is_regression(next) {
        tracing::warn!(
            transport_id = id,
            from = %previous,
            to = %next,
            user_id = auth.user_id,
            "Transport status moved backwards",
        );
    }

    let mut note = tracking::status_change(previous, next);
    if let Some(extra) = input
        .observations
        .as_deref()
        .and_then(|v| sanitize_text(v, MAX_CLINICAL_TEXT_LEN))
    {
        note.observations = Some(match note.observations.take() {
            Some(base) => format!("{base}. {extra}"),
            None => extra,
        });
    }
    let note = CreateTrackingEntry::from_note(id, auth.user_id, note);

    let transport = TransportRepo::update_status(
        &state.pool,
        id,
        previous.as_str(),
        next.as_str(),
        &note,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Transport status was changed by another user; reload and retry".into(),
        ))
    })?;

    tracing::info!(
        transport_id = id,
        from = %previous,
        to = %next,
        user_id = auth.user_id,
        "Transport status changed",
    );
    Ok(Json(DataResponse { data: transport }))
}

/// PUT /api/v1/transports/{id}/team
///
/// Only the provided fields change. The tracking entry lists the resulting
/// crew.
pub async fn assign_team(
    RequireCoordinator(user): RequireCoordinator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TeamAssignmentRequest>,
) -> AppResult<Json<DataResponse<TransportRequest>>> {
    if let Some(assignee) = input.assigned_user_id {
        let active = UserRepo::find_by_id(&state.pool, assignee)
            .await?
            .is_some_and(|u| u.is_active);
        if !active {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Assigned user {assignee} does not exist or is inactive"
            ))));
        }
    }

    let current = require_transport(&state, id).await?;

    let team = TeamAssignment {
        departure_time: input.departure_time,
        doctor_name: non_blank(input.doctor_name.as_deref()).map(capitalize_name),
        nurse_name: non_blank(input.nurse_name.as_deref()).map(capitalize_name),
        pilot_name: non_blank(input.pilot_name.as_deref()).map(capitalize_name),
        aircraft_registration: non_blank(input.aircraft_registration.as_deref()).map(upper_clean),
        assigned_user_id: input.assigned_user_id,
    };

    let note = tracking::team_assigned(
        team.doctor_name.as_deref().or(current.doctor_name.as_deref()),
        team.nurse_name.as_deref().or(current.nurse_name.as_deref()),
        team.pilot_name.as_deref().or(current.pilot_name.as_deref()),
        team
            .aircraft_registration
            .as_deref()
            .or(current.aircraft_registration.as_deref()),
    );
    let note = CreateTrackingEntry::from_note(id, user.user_id, note);

    let transport = TransportRepo::assign_team(&state.pool, id, &team, &note)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(transport_id = id, assigned_by = user.user_id, "Transport team assigned");
    Ok(Json(DataResponse { data: transport }))
}

/// PUT /api/v1/transports/{id}/epicrisis
pub async fn update_epicrisis(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EpicrisisRequest>,
) -> AppResult<Json<DataResponse<TransportRequest>>> {
    let epicrisis = sanitize_text(&input.epicrisis, MAX_EPICRISIS_LEN)
        .ok_or_else(|| AppError::Core(CoreError::Validation("Epicrisis is required".into())))?;

    let note = CreateTrackingEntry::from_note(id, auth.user_id, tracking::epicrisis_updated());
    let transport = TransportRepo::update_epicrisis(&state.pool, id, &epicrisis, &note)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(transport_id = id, user_id = auth.user_id, "Epicrisis updated");
    Ok(Json(DataResponse { data: transport }))
}

/// DELETE /api/v1/transports/{id}
///
/// Transports in flight or completed are kept. Clinical rows and tracking
/// go with the transport.
pub async fn delete_transport(
    RequireCoordinator(user): RequireCoordinator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let current = require_transport(&state, id).await?;
    let status = stored_status(&current)?;
    if !status.is_deletable() {
        return Err(undeletable(status));
    }

    let protected: Vec<String> = TransportStatus::ALL
        .iter()
        .filter(|s| !s.is_deletable())
        .map(|s| s.as_str().to_string())
        .collect();

    if !TransportRepo::delete_unless(&state.pool, id, &protected).await? {
        // Gone, or moved into a protected status since it was read.
        let current = require_transport(&state, id).await?;
        return Err(undeletable(stored_status(&current)?));
    }

    tracing::info!(
        transport_id = id,
        transport_number = %current.transport_number,
        deleted_by = user.user_id,
        "Transport deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a transport that must exist, mapping absence to 404.
pub(crate) async fn require_transport(state: &AppState, id: DbId) -> AppResult<TransportRequest> {
    TransportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Transport",
        id,
    })
}

fn undeletable(status: TransportStatus) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Transports in status {status} cannot be deleted"
    )))
}

fn stored_status(transport: &TransportRequest) -> AppResult<TransportStatus> {
    TransportStatus::parse(&transport.status).ok_or_else(|| {
        AppError::InternalError(format!(
            "Transport {} has unknown status '{}'",
            transport.id, transport.status
        ))
    })
}

/// Draw random numbers for the current year until an unused one is found.
async fn allocate_transport_number(state: &AppState) -> AppResult<String> {
    let year = Utc::now().year();
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let candidate = random_transport_number(year);
        if !TransportRepo::number_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::InternalError(format!(
        "No free transport number for {year} after {MAX_NUMBER_ATTEMPTS} attempts"
    )))
}

async fn check_hospital(state: &AppState, id: Option<DbId>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    if HospitalRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Hospital {id} does not exist"
        ))));
    }
    Ok(())
}

fn check_measurement(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(AppError::Core(CoreError::Validation(
            format!("{field} must be a positive number"),
        ))),
        _ => Ok(()),
    }
}

fn required(field: &str, value: String) -> AppResult<String> {
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} is required"
        ))));
    }
    Ok(value)
}

/// For partial updates: absent is fine, present-but-blank is not.
fn optional_required(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    value.map(|v| required(field, v)).transpose()
}
