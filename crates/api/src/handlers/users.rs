//! Handlers for `/users` (admin only).
//!
//! Accounts are created by an admin with a temporary password. The welcome
//! email carries that password and a verification link; the first login
//! replaces the password through the token flow in [`super::account`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use aerosamec_core::codes::{parse_optional, StaffFunction};
use aerosamec_core::error::CoreError;
use aerosamec_core::formatting::{capitalize_name, format_dni, format_email, format_phone, non_blank};
use aerosamec_core::roles::UserRole;
use aerosamec_core::tokens::{
    generate_temporary_password, generate_token, resend_wait_minutes, VERIFICATION_TOKEN_BYTES,
};
use aerosamec_core::types::DbId;
use aerosamec_db::models::user::{CreateUser, UpdateUser, UserResponse};
use aerosamec_db::repositories::{SessionRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::require_user;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{AckResponse, DataResponse};
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "DNI is required"))]
    pub dni: String,
    pub phone: Option<String>,
    pub role: String,
    pub function: String,
}

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dni: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub function: Option<String>,
    pub is_active: Option<bool>,
}

/// Response of `POST /users`.
///
/// `email_sent` is false when the welcome email could not be delivered; the
/// admin can retry with resend-verification.
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: UserResponse,
    pub email_sent: bool,
}

/// GET /api/v1/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = require_user(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/users
///
/// Create an account with a temporary password and email it together with
/// the verification link.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedUser>>)> {
    input.email = format_email(&input.email);
    input.validate()?;
    let role: UserRole = input.role.parse()?;
    let function: StaffFunction = input.function.parse()?;

    let email = input.email;
    let first_name = required_name(&input.first_name, "First name")?;
    let last_name = required_name(&input.last_name, "Last name")?;
    let dni = required_dni(&input.dni)?;
    let phone = non_blank(input.phone.as_deref()).map(format_phone);

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email already exists".into(),
        )));
    }
    if UserRepo::find_by_dni(&state.pool, &dni).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this DNI already exists".into(),
        )));
    }

    let temporary_password = generate_temporary_password();
    let password_hash = hash_password(&temporary_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let token = generate_token(VERIFICATION_TOKEN_BYTES);

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            first_name,
            last_name,
            dni,
            phone,
            role: role.as_str().to_string(),
            function: function.as_str().to_string(),
            password_temporary: true,
            email_verified: false,
            verification_token_hash: Some(token.hash),
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        created_by = admin.user_id,
        "User created",
    );

    let email_sent = match state
        .notifier
        .send_account_created(&user.email, &user.first_name, &temporary_password, &token.plaintext)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(user_id = user.id, error = %e, "Failed to send welcome email");
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedUser {
                user: UserResponse::from(&user),
                email_sent,
            },
        }),
    ))
}

/// PUT /api/v1/users/{id}
///
/// Email and password cannot be changed here.
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = parse_optional::<UserRole>(input.role.as_deref())?;
    let function = parse_optional::<StaffFunction>(input.function.as_deref())?;

    let first_name = input
        .first_name
        .as_deref()
        .map(|v| required_name(v, "First name"))
        .transpose()?;
    let last_name = input
        .last_name
        .as_deref()
        .map(|v| required_name(v, "Last name"))
        .transpose()?;
    let dni = input.dni.as_deref().map(required_dni).transpose()?;

    if let Some(dni) = &dni {
        if let Some(holder) = UserRepo::find_by_dni(&state.pool, dni).await? {
            if holder.id != id {
                return Err(AppError::Core(CoreError::Conflict(
                    "A user with this DNI already exists".into(),
                )));
            }
        }
    }

    let update = UpdateUser {
        first_name,
        last_name,
        dni,
        phone: non_blank(input.phone.as_deref()).map(format_phone),
        role: role.map(|r| r.as_str().to_string()),
        function: function.map(|f| f.as_str().to_string()),
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        tracing::info!(user_id = id, revoked, "Sessions revoked for deactivated user");
    }

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Hard delete. Admins cannot delete their own account or the primary admin;
/// users still referenced by transports or clinical records yield 409.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot delete your own account".into(),
        )));
    }

    let user = require_user(&state, id).await?;
    if user.email == state.config.primary_admin_email {
        return Err(AppError::Core(CoreError::Forbidden(
            "The primary administrator cannot be deleted".into(),
        )));
    }

    UserRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{id}/resend-verification
pub async fn resend_verification(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<AckResponse>> {
    let user = require_user(&state, id).await?;

    if user.email_verified {
        return Err(AppError::BadRequest("Email is already verified".into()));
    }
    if let Some(wait) = resend_wait_minutes(user.verification_sent_at, Utc::now()) {
        return Err(AppError::Core(CoreError::RateLimited(format!(
            "Wait {wait} minute(s) before resending the verification email"
        ))));
    }

    let token = generate_token(VERIFICATION_TOKEN_BYTES);
    UserRepo::set_verification_token(&state.pool, user.id, &token.hash).await?;

    state
        .notifier
        .send_verification_resent(&user.email, &user.first_name, &token.plaintext)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send verification email: {e}")))?;

    tracing::info!(user_id = id, requested_by = admin.user_id, "Verification email resent");
    Ok(Json(AckResponse::ok("Verification email sent")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required_name(raw: &str, field: &str) -> AppResult<String> {
    let name = capitalize_name(raw);
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} is required"
        ))));
    }
    Ok(name)
}

fn required_dni(raw: &str) -> AppResult<String> {
    let dni = format_dni(raw);
    if dni.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "DNI must contain digits".into(),
        )));
    }
    Ok(dni)
}
