//! First-start provisioning of the primary administrator.
//!
//! A fresh database has no users, so nobody could log in to create the
//! first account. When the `users` table is empty and a bootstrap password
//! is configured, the primary admin is created with that password.

use aerosamec_core::codes::StaffFunction;
use aerosamec_core::error::CoreError;
use aerosamec_core::roles::UserRole;
use aerosamec_core::types::DbId;
use aerosamec_db::models::user::CreateUser;
use aerosamec_db::repositories::UserRepo;
use aerosamec_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};

/// Placeholder DNI of the bootstrapped account; editable afterwards.
const PRIMARY_ADMIN_DNI: &str = "00000000";

/// What [`ensure_primary_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Users already exist; nothing to do.
    AlreadyProvisioned,
    /// The users table is empty but no bootstrap password was configured.
    MissingPassword,
    Created(DbId),
}

/// Create the primary admin when no user exists yet.
///
/// The account is created verified and with a non-temporary password, so it
/// can log in straight away.
pub async fn ensure_primary_admin(
    pool: &DbPool,
    email: &str,
    password: Option<&str>,
) -> AppResult<BootstrapOutcome> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(BootstrapOutcome::AlreadyProvisioned);
    }

    let Some(password) = password.filter(|p| !p.is_empty()) else {
        tracing::warn!(
            email,
            "No users exist and BOOTSTRAP_ADMIN_PASSWORD is not set; primary admin not created",
        );
        return Ok(BootstrapOutcome::MissingPassword);
    };

    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let admin = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            first_name: "Administrador".into(),
            last_name: "Principal".into(),
            dni: PRIMARY_ADMIN_DNI.into(),
            phone: None,
            role: UserRole::Admin.as_str().to_string(),
            function: StaffFunction::Administrative.as_str().to_string(),
            password_temporary: false,
            email_verified: true,
            verification_token_hash: None,
        },
    )
    .await?;

    tracing::info!(user_id = admin.id, email, "Primary admin account created");
    Ok(BootstrapOutcome::Created(admin.id))
}
