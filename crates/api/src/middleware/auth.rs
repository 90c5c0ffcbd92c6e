//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use aerosamec_core::error::CoreError;
use aerosamec_core::roles::UserRole;
use aerosamec_core::types::DbId;
use aerosamec_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, as stated by a valid access token and confirmed against the
/// `users` table.
///
/// The role comes from the stored account, so deactivation, deletion and
/// role changes take effect on the next request.
///
/// Handlers that only need "someone is logged in" take this directly; role
/// checks go through the extractors in [`crate::middleware::rbac`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: UserRole,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            unauthorized("Invalid or expired token")
        })?;
        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                tracing::debug!(user_id = claims.sub, "Token for missing or inactive user");
                unauthorized("Account is no longer active")
            })?;
        let role = UserRole::parse(&user.role)
            .ok_or_else(|| AppError::InternalError(format!("Unknown role code: {}", user.role)))?;

        Ok(AuthUser {
            user_id: user.id,
            role,
        })
    }
}

/// The token after `Bearer ` in the `Authorization` header. The scheme is
/// matched case-insensitively.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>",
        )),
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
