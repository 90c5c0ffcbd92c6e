//! Route definitions for the `/hospitals` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::hospitals;
use crate::state::AppState;

/// Routes mounted at `/hospitals`.
///
/// ```text
/// GET  /      -> list_hospitals
/// POST /      -> create_hospital (admin)
/// GET  /{id}  -> get_hospital
/// PUT  /{id}  -> update_hospital (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(hospitals::list_hospitals).post(hospitals::create_hospital),
        )
        .route(
            "/{id}",
            get(hospitals::get_hospital).put(hospitals::update_hospital),
        )
}
