//! Transport request entity model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use aerosamec_core::age::PatientAge;
use aerosamec_core::types::{DbId, Timestamp};

/// A row from the `transport_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransportRequest {
    pub id: DbId,
    pub transport_number: String,
    pub requested_at: Timestamp,
    pub transport_date: Option<Timestamp>,

    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_dni: String,
    pub patient_birth_date: NaiveDate,
    pub patient_age_years: i32,
    pub patient_age_months: i32,
    pub patient_age_days: i32,
    pub patient_sex: String,
    pub patient_weight_kg: Option<f64>,
    pub patient_height_cm: Option<f64>,
    pub patient_address: Option<String>,
    pub patient_locality: Option<String>,
    pub has_coverage: bool,
    pub coverage_number: Option<String>,

    pub requesting_institution: String,
    pub professional_name: String,
    pub professional_phone: String,
    pub request_reason: String,
    pub diagnoses: String,
    pub triage_code: String,

    pub departure_time: Option<Timestamp>,
    pub doctor_name: Option<String>,
    pub nurse_name: Option<String>,
    pub pilot_name: Option<String>,
    pub aircraft_registration: Option<String>,
    pub assigned_user_id: Option<DbId>,

    pub complexity: Option<String>,
    pub patient_category: Option<String>,
    pub priority: String,

    pub status: String,
    pub observations: Option<String>,
    pub epicrisis: Option<String>,

    pub origin_hospital_id: Option<DbId>,
    pub destination_hospital_id: Option<DbId>,
    pub created_by: DbId,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A transport with the display names the boards show next to it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransportListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transport: TransportRequest,
    pub origin_hospital_name: Option<String>,
    pub destination_hospital_name: Option<String>,
    pub created_by_name: String,
    pub assigned_user_name: Option<String>,
}

/// Age breakdown as stored on the row.
#[derive(Debug, Clone, Copy)]
pub struct StoredAge {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl From<PatientAge> for StoredAge {
    fn from(age: PatientAge) -> Self {
        Self {
            years: age.years,
            months: age.months,
            days: age.days,
        }
    }
}

/// DTO for inserting a transport request. Values are already normalized.
#[derive(Debug, Clone)]
pub struct CreateTransport {
    pub transport_number: String,
    pub transport_date: Option<Timestamp>,

    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_dni: String,
    pub patient_birth_date: NaiveDate,
    pub patient_age: StoredAge,
    pub patient_sex: String,
    pub patient_weight_kg: Option<f64>,
    pub patient_height_cm: Option<f64>,
    pub patient_address: Option<String>,
    pub patient_locality: Option<String>,
    pub has_coverage: bool,
    pub coverage_number: Option<String>,

    pub requesting_institution: String,
    pub professional_name: String,
    pub professional_phone: String,
    pub request_reason: String,
    pub diagnoses: String,
    pub triage_code: String,

    pub complexity: Option<String>,
    pub patient_category: Option<String>,
    pub priority: String,
    pub observations: Option<String>,

    pub origin_hospital_id: Option<DbId>,
    pub destination_hospital_id: Option<DbId>,
    pub created_by: DbId,
}

/// DTO for editing a transport request. Only `Some` fields are applied.
///
/// `patient_age` must be supplied together with `patient_birth_date`.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransport {
    pub transport_date: Option<Timestamp>,

    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_dni: Option<String>,
    pub patient_birth_date: Option<NaiveDate>,
    pub patient_age: Option<StoredAge>,
    pub patient_sex: Option<String>,
    pub patient_weight_kg: Option<f64>,
    pub patient_height_cm: Option<f64>,
    pub patient_address: Option<String>,
    pub patient_locality: Option<String>,
    pub has_coverage: Option<bool>,
    pub coverage_number: Option<String>,

    pub requesting_institution: Option<String>,
    pub professional_name: Option<String>,
    pub professional_phone: Option<String>,
    pub request_reason: Option<String>,
    pub diagnoses: Option<String>,
    pub triage_code: Option<String>,

    pub complexity: Option<String>,
    pub patient_category: Option<String>,
    pub priority: Option<String>,
    pub observations: Option<String>,

    pub origin_hospital_id: Option<DbId>,
    pub destination_hospital_id: Option<DbId>,
}

/// Crew and aircraft assignment. Only `Some` fields change.
#[derive(Debug, Clone, Default)]
pub struct TeamAssignment {
    pub departure_time: Option<Timestamp>,
    pub doctor_name: Option<String>,
    pub nurse_name: Option<String>,
    pub pilot_name: Option<String>,
    pub aircraft_registration: Option<String>,
    pub assigned_user_id: Option<DbId>,
}

/// Filter and pagination for transport listings.
#[derive(Debug, Clone, Default)]
pub struct TransportQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
