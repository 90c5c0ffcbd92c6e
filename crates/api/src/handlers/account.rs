//! Handlers for the single-use token flows under `/auth`.
//!
//! Two kinds of token live on the user row, both stored as SHA-256 hashes:
//!
//! - the **verification** token, issued with the temporary password when an
//!   admin creates the account (and on resend). It is valid for 24 hours
//!   from when it was sent and is consumed by the first-login password change.
//! - the **reset** token, issued by "forgot password". It expires after one
//!   hour and is consumed by the reset.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::format_email;
use aerosamec_core::tokens::{
    generate_token, hash_token, reset_token_expiry, verification_token_expired, TokenContext,
    RESET_TOKEN_BYTES,
};
use aerosamec_db::models::user::{User, UserResponse};
use aerosamec_db::repositories::{SessionRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::query::TokenParams;
use crate::response::{AckResponse, DataResponse};
use crate::state::AppState;

const INVALID_TOKEN: &str = "Invalid or expired token";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request body for `POST /auth/reset-password` and `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct TokenPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Request body for `POST /auth/verify-token` and `POST /auth/resolve-token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Response of `POST /auth/resolve-token`.
#[derive(Debug, Serialize)]
pub struct ResolvedToken {
    pub context: TokenContext,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/forgot-password
///
/// Always answers 200 so the endpoint cannot be used to discover which emails
/// have accounts. Known, active accounts get a reset link by email.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<AckResponse>> {
    input.email = format_email(&input.email);
    input.validate()?;
    let email = input.email;
    let ack = AckResponse::ok("If the account exists, a reset link has been sent");

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(Json(ack));
    };
    if !user.is_active {
        tracing::debug!(user_id = user.id, "Password reset requested for inactive account");
        return Ok(Json(ack));
    }

    let token = generate_token(RESET_TOKEN_BYTES);
    UserRepo::set_reset_token(&state.pool, user.id, &token.hash, reset_token_expiry(Utc::now()))
        .await?;

    if let Err(e) = state
        .notifier
        .send_password_reset(&user.email, &user.first_name, &token.plaintext)
        .await
    {
        tracing::error!(user_id = user.id, error = %e, "Failed to send password reset email");
    } else {
        tracing::info!(user_id = user.id, "Password reset email sent");
    }

    Ok(Json(ack))
}

/// POST /api/v1/auth/reset-password
///
/// Consume a live reset token and set the new password. All sessions of the
/// account are revoked.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<TokenPasswordRequest>,
) -> AppResult<Json<AckResponse>> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let token_hash = hash_token(&input.token);
    let user = UserRepo::find_by_reset_token(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.into()))?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::reset_password(&state.pool, user.id, &token_hash, &password_hash).await? {
        // Consumed concurrently.
        return Err(AppError::BadRequest(INVALID_TOKEN.into()));
    }
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Password reset completed");
    Ok(Json(AckResponse::ok("Password updated")))
}

// ---------------------------------------------------------------------------
// Email verification / first login
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/verify-email?token=
///
/// Look up the account of a verification link that has not been used yet.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Token is required".into()))?;

    let user = UserRepo::find_by_verification_token(&state.pool, &hash_token(&token))
        .await?
        .filter(|u| !u.email_verified)
        .ok_or_else(|| AppError::BadRequest("Invalid or already used token".into()))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/verify-token
///
/// Check a verification token before showing the first-login form.
pub async fn verify_token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_fresh_verification_user(&state, &input.token).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/change-password
///
/// First-login password change. Replaces the temporary password, marks the
/// email verified and consumes the verification token.
pub async fn change_password(
    State(state): State<AppState>,
    Json(input): Json<TokenPasswordRequest>,
) -> AppResult<Json<AckResponse>> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let user = find_fresh_verification_user(&state, &input.token).await?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let token_hash = hash_token(&input.token);
    if !UserRepo::complete_first_login(&state.pool, user.id, &token_hash, &password_hash).await? {
        return Err(AppError::BadRequest(INVALID_TOKEN.into()));
    }
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "First-login password change completed");
    Ok(Json(AckResponse::ok(
        "Password changed. You can now log in with your new password.",
    )))
}

/// POST /api/v1/auth/resolve-token
///
/// Tell the client which flow a token belongs to. A live reset token wins
/// over a verification token.
pub async fn resolve_token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<DataResponse<ResolvedToken>>> {
    let token_hash = hash_token(&input.token);

    if let Some(user) = UserRepo::find_by_reset_token(&state.pool, &token_hash).await? {
        return Ok(Json(DataResponse {
            data: ResolvedToken {
                context: TokenContext::ResetPassword,
                user: UserResponse::from(&user),
            },
        }));
    }

    if let Some(user) = UserRepo::find_by_verification_token(&state.pool, &token_hash).await? {
        return Ok(Json(DataResponse {
            data: ResolvedToken {
                context: TokenContext::FirstLogin,
                user: UserResponse::from(&user),
            },
        }));
    }

    Err(AppError::BadRequest(INVALID_TOKEN.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find the active account holding `token` as a verification token sent
/// within the last 24 hours.
async fn find_fresh_verification_user(state: &AppState, token: &str) -> AppResult<User> {
    let user = UserRepo::find_by_verification_token(&state.pool, &hash_token(token))
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.into()))?;

    let sent_at = user.verification_sent_at.unwrap_or(user.created_at);
    if verification_token_expired(sent_at, Utc::now()) {
        return Err(AppError::BadRequest(
            "Token expired. Request a new verification link.".into(),
        ));
    }
    Ok(user)
}
