//! Route definitions for the `/transports` resource and its sub-resources.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{clinical, tracking, transports};
use crate::state::AppState;

/// Routes mounted at `/transports`.
///
/// ```text
/// GET    /                    -> list_transports
/// POST   /                    -> create_transport (coordinator)
/// GET    /active              -> list_active_transports
/// GET    /{id}                -> get_transport
/// PUT    /{id}                -> update_transport (coordinator)
/// DELETE /{id}                -> delete_transport (coordinator)
/// PUT    /{id}/status         -> change_status
/// PUT    /{id}/team           -> assign_team (coordinator)
/// PUT    /{id}/epicrisis      -> update_epicrisis
///
/// GET    /{id}/procedures     -> list_procedures
/// POST   /{id}/procedures     -> create_procedure
/// GET    /{id}/medications    -> list_medications
/// POST   /{id}/medications    -> create_medication
/// GET    /{id}/vital-signs    -> list_vital_signs
/// POST   /{id}/vital-signs    -> create_vital_signs
///
/// GET    /{id}/tracking       -> list_tracking
/// POST   /{id}/tracking       -> create_tracking_entry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(transports::list_transports).post(transports::create_transport),
        )
        .route("/active", get(transports::list_active_transports))
        .route(
            "/{id}",
            get(transports::get_transport)
                .put(transports::update_transport)
                .delete(transports::delete_transport),
        )
        .route("/{id}/status", put(transports::change_status))
        .route("/{id}/team", put(transports::assign_team))
        .route("/{id}/epicrisis", put(transports::update_epicrisis))
        // Clinical record.
        .route(
            "/{id}/procedures",
            get(clinical::list_procedures).post(clinical::create_procedure),
        )
        .route(
            "/{id}/medications",
            get(clinical::list_medications).post(clinical::create_medication),
        )
        .route(
            "/{id}/vital-signs",
            get(clinical::list_vital_signs).post(clinical::create_vital_signs),
        )
        // Tracking log.
        .route(
            "/{id}/tracking",
            get(tracking::list_tracking).post(tracking::create_tracking_entry),
        )
}
