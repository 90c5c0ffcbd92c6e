pub mod auth;
pub mod health;
pub mod hospitals;
pub mod transports;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public)
/// /auth/logout                                 logout (requires auth)
/// /auth/me                                     current user (requires auth)
/// /auth/forgot-password                        request reset link (public)
/// /auth/reset-password                         consume reset token (public)
/// /auth/verify-email                           look up verification link (public)
/// /auth/verify-token                           check verification token (public)
/// /auth/change-password                        first-login password (public)
/// /auth/resolve-token                          which flow a token belongs to (public)
///
/// /users                                       list, create (admin only)
/// /users/{id}                                  get, update, delete
/// /users/{id}/resend-verification              resend welcome link
///
/// /hospitals                                   list (auth), create (admin)
/// /hospitals/{id}                              get (auth), update (admin)
///
/// /transports                                  list (auth), create (coordinator)
/// /transports/active                           operator board (auth)
/// /transports/{id}                             detail (auth), edit, delete (coordinator)
/// /transports/{id}/status                      change status (auth)
/// /transports/{id}/team                        assign crew (coordinator)
/// /transports/{id}/epicrisis                   final summary (auth)
/// /transports/{id}/procedures                  list, record (auth)
/// /transports/{id}/medications                 list, record (auth)
/// /transports/{id}/vital-signs                 list, record (auth)
/// /transports/{id}/tracking                    list, add note (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Sessions and token flows.
        .nest("/auth", auth::router())
        // Account administration.
        .nest("/users", users::router())
        // Hospital catalogue.
        .nest("/hospitals", hospitals::router())
        // Transport requests and their clinical record.
        .nest("/transports", transports::router())
}
