//! Clinical record models: procedures, medications and vital-sign readings.
//!
//! Rows are immutable once written; there are no update DTOs.

use serde::Serialize;
use sqlx::FromRow;
use aerosamec_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Procedures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Procedure {
    pub id: DbId,
    pub transport_id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateProcedure {
    pub transport_id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
    /// Defaults to now when absent.
    pub recorded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Medication {
    pub id: DbId,
    pub transport_id: DbId,
    pub user_id: DbId,
    pub drug: String,
    pub dose: String,
    pub route: String,
    pub observations: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateMedication {
    pub transport_id: DbId,
    pub user_id: DbId,
    pub drug: String,
    pub dose: String,
    pub route: String,
    pub observations: Option<String>,
    pub recorded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Vital signs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VitalSignReading {
    pub id: DbId,
    pub transport_id: DbId,
    pub user_id: DbId,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i32>,
    pub glasgow: Option<i32>,
    pub observations: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateVitalSignReading {
    pub transport_id: DbId,
    pub user_id: DbId,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i32>,
    pub glasgow: Option<i32>,
    pub observations: Option<String>,
    pub recorded_at: Option<Timestamp>,
}
