//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{account, auth};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login            -> login
/// POST /refresh          -> refresh
/// POST /logout           -> logout (requires auth)
/// GET  /me               -> me (requires auth)
/// POST /forgot-password  -> forgot_password
/// POST /reset-password   -> reset_password
/// GET  /verify-email     -> verify_email
/// POST /verify-token     -> verify_token
/// POST /change-password  -> change_password
/// POST /resolve-token    -> resolve_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/forgot-password", post(account::forgot_password))
        .route("/reset-password", post(account::reset_password))
        .route("/verify-email", get(account::verify_email))
        .route("/verify-token", post(account::verify_token))
        .route("/change-password", post(account::change_password))
        .route("/resolve-token", post(account::resolve_token))
}
