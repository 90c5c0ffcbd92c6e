//! Role extractors layered on [`AuthUser`].
//!
//! | Extractor              | Roles                   |
//! |------------------------|-------------------------|
//! | [`RequireAdmin`]       | `ADMIN`                 |
//! | [`RequireCoordinator`] | `ADMIN`, `COORDINADOR`  |
//!
//! Endpoints open to every role take [`AuthUser`] directly. A valid token
//! with the wrong role is rejected with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use aerosamec_core::error::CoreError;
use aerosamec_core::roles::UserRole;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// User management and hospital catalogue.
pub struct RequireAdmin(pub AuthUser);

/// Creating, editing, staffing and deleting transports.
pub struct RequireCoordinator(pub AuthUser);

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(UserRole) -> bool,
    denied: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(user.role) {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(denied.to_string())));
    }
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |role| role == UserRole::Admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

impl FromRequestParts<AppState> for RequireCoordinator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            parts,
            state,
            UserRole::can_coordinate,
            "Coordinator or Admin role required",
        )
        .await
        .map(RequireCoordinator)
    }
}
