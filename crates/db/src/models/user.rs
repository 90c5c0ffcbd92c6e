//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use aerosamec_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password and token hashes -- NEVER serialize this to API
/// responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub phone: Option<String>,
    pub role: String,
    pub function: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub password_temporary: bool,
    pub verification_token_hash: Option<String>,
    pub verification_sent_at: Option<Timestamp>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no hashes).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub phone: Option<String>,
    pub role: String,
    pub function: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub password_temporary: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            dni: user.dni.clone(),
            phone: user.phone.clone(),
            role: user.role.clone(),
            function: user.function.clone(),
            is_active: user.is_active,
            email_verified: user.email_verified,
            password_temporary: user.password_temporary,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. Values are already normalized and hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub phone: Option<String>,
    pub role: String,
    pub function: String,
    /// `false` only for the bootstrapped primary admin.
    pub password_temporary: bool,
    pub email_verified: bool,
    pub verification_token_hash: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
///
/// Email and password are changed only through the token flows.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dni: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub function: Option<String>,
    pub is_active: Option<bool>,
}
