//! Repository for `procedures`, `medications` and `vital_sign_readings`.
//!
//! Each insert writes its tracking entry in the same transaction.

use sqlx::PgPool;
use aerosamec_core::types::DbId;

use crate::models::clinical::{
    CreateMedication, CreateProcedure, CreateVitalSignReading, Medication, Procedure,
    VitalSignReading,
};
use crate::models::tracking::CreateTrackingEntry;
use crate::repositories::TrackingRepo;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const PROCEDURE_COLUMNS: &str =
    "id, transport_id, user_id, kind, description, observations, recorded_at, created_at";

const MEDICATION_COLUMNS: &str =
    "id, transport_id, user_id, drug, dose, route, observations, recorded_at, created_at";

const VITAL_SIGN_COLUMNS: &str = "id, transport_id, user_id, heart_rate, respiratory_rate, \
    systolic_bp, diastolic_bp, temperature_c, spo2, glasgow, observations, recorded_at, created_at";

pub struct ClinicalRepo;

impl ClinicalRepo {
    // -----------------------------------------------------------------------
    // Procedures
    // -----------------------------------------------------------------------

    pub async fn create_procedure(
        pool: &PgPool,
        input: &CreateProcedure,
        note: &CreateTrackingEntry,
    ) -> Result<Procedure, sqlx::Error> {
        let query = format!(
            "INSERT INTO procedures (transport_id, user_id, kind, description, observations, recorded_at)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
             RETURNING {PROCEDURE_COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let procedure = sqlx::query_as::<_, Procedure>(&query)
            .bind(input.transport_id)
            .bind(input.user_id)
            .bind(&input.kind)
            .bind(&input.description)
            .bind(&input.observations)
            .bind(input.recorded_at)
            .fetch_one(&mut *tx)
            .await?;
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(procedure)
    }

    /// Procedures of a transport, most recent first.
    pub async fn list_procedures(
        pool: &PgPool,
        transport_id: DbId,
    ) -> Result<Vec<Procedure>, sqlx::Error> {
        let query = format!(
            "SELECT {PROCEDURE_COLUMNS} FROM procedures
             WHERE transport_id = $1
             ORDER BY recorded_at DESC, id DESC"
        );
        sqlx::query_as::<_, Procedure>(&query)
            .bind(transport_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Medications
    // -----------------------------------------------------------------------

    pub async fn create_medication(
        pool: &PgPool,
        input: &CreateMedication,
        note: &CreateTrackingEntry,
    ) -> Result<Medication, sqlx::Error> {
        let query = format!(
            "INSERT INTO medications (transport_id, user_id, drug, dose, route, observations, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
             RETURNING {MEDICATION_COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let medication = sqlx::query_as::<_, Medication>(&query)
            .bind(input.transport_id)
            .bind(input.user_id)
            .bind(&input.drug)
            .bind(&input.dose)
            .bind(&input.route)
            .bind(&input.observations)
            .bind(input.recorded_at)
            .fetch_one(&mut *tx)
            .await?;
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(medication)
    }

    pub async fn list_medications(
        pool: &PgPool,
        transport_id: DbId,
    ) -> Result<Vec<Medication>, sqlx::Error> {
        let query = format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications
             WHERE transport_id = $1
             ORDER BY recorded_at DESC, id DESC"
        );
        sqlx::query_as::<_, Medication>(&query)
            .bind(transport_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Vital signs
    // -----------------------------------------------------------------------

    pub async fn create_vital_signs(
        pool: &PgPool,
        input: &CreateVitalSignReading,
        note: &CreateTrackingEntry,
    ) -> Result<VitalSignReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO vital_sign_readings (
                transport_id, user_id, heart_rate, respiratory_rate, systolic_bp,
                diastolic_bp, temperature_c, spo2, glasgow, observations, recorded_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, NOW()))
             RETURNING {VITAL_SIGN_COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let reading = sqlx::query_as::<_, VitalSignReading>(&query)
            .bind(input.transport_id)
            .bind(input.user_id)
            .bind(input.heart_rate)
            .bind(input.respiratory_rate)
            .bind(input.systolic_bp)
            .bind(input.diastolic_bp)
            .bind(input.temperature_c)
            .bind(input.spo2)
            .bind(input.glasgow)
            .bind(&input.observations)
            .bind(input.recorded_at)
            .fetch_one(&mut *tx)
            .await?;
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(reading)
    }

    pub async fn list_vital_signs(
        pool: &PgPool,
        transport_id: DbId,
    ) -> Result<Vec<VitalSignReading>, sqlx::Error> {
        let query = format!(
            "SELECT {VITAL_SIGN_COLUMNS} FROM vital_sign_readings
             WHERE transport_id = $1
             ORDER BY recorded_at DESC, id DESC"
        );
        sqlx::query_as::<_, VitalSignReading>(&query)
            .bind(transport_id)
            .fetch_all(pool)
            .await
    }
}
