//! Handlers for `/transports/{id}/tracking`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::{clean_text, sanitize_text, MAX_CLINICAL_TEXT_LEN};
use aerosamec_core::tracking::{TrackingKind, TrackingNote};
use aerosamec_core::types::DbId;
use aerosamec_db::models::tracking::{CreateTrackingEntry, TrackingEntry};
use aerosamec_db::repositories::TrackingRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::transports::require_transport;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /transports/{id}/tracking`.
#[derive(Debug, Deserialize)]
pub struct CreateTrackingRequest {
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
}

/// GET /api/v1/transports/{id}/tracking
///
/// The full log, oldest first.
pub async fn list_tracking(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TrackingEntry>>>> {
    require_transport(&state, id).await?;
    let entries = TrackingRepo::list_for_transport(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/transports/{id}/tracking
///
/// Manual note by the crew or dispatch. Status changes are only recorded
/// through the status endpoint.
pub async fn create_tracking_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTrackingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TrackingEntry>>)> {
    let kind: TrackingKind = input.kind.trim().parse()?;
    if kind == TrackingKind::StatusChange {
        return Err(AppError::Core(CoreError::Validation(
            "Status changes are recorded by updating the transport status".into(),
        )));
    }

    let description = clean_text(&input.description);
    if description.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "description is required".into(),
        )));
    }

    require_transport(&state, id).await?;

    let mut note = TrackingNote::new(kind, description);
    note.observations = input
        .observations
        .as_deref()
        .and_then(|v| sanitize_text(v, MAX_CLINICAL_TEXT_LEN));

    let entry =
        TrackingRepo::create(&state.pool, &CreateTrackingEntry::from_note(id, auth.user_id, note))
            .await?;

    tracing::info!(
        transport_id = id,
        entry_id = entry.id,
        kind = %entry.kind,
        user_id = auth.user_id,
        "Tracking entry added",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}
