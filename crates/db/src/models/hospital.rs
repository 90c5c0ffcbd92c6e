//! Hospital entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use aerosamec_core::types::{DbId, Timestamp};

/// A row from the `hospitals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hospital {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub kind: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a hospital.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHospital {
    pub name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub kind: Option<String>,
}

/// DTO for updating a hospital. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHospital {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub kind: Option<String>,
    pub is_active: Option<bool>,
}
