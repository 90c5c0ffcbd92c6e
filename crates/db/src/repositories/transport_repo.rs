//! Repository for the `transport_requests` table.
//!
//! Every mutation that dispatch must be able to audit (edit, status, team,
//! epicrisis) takes the tracking entry describing it and writes both rows
//! in one transaction.

use sqlx::PgPool;
use aerosamec_core::types::DbId;

use crate::models::tracking::CreateTrackingEntry;
use crate::models::transport::{
    CreateTransport, TeamAssignment, TransportListItem, TransportQuery, TransportRequest,
    UpdateTransport,
};
use crate::repositories::TrackingRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, transport_number, requested_at, transport_date, \
    patient_first_name, patient_last_name, patient_dni, patient_birth_date, \
    patient_age_years, patient_age_months, patient_age_days, patient_sex, \
    patient_weight_kg, patient_height_cm, patient_address, patient_locality, \
    has_coverage, coverage_number, \
    requesting_institution, professional_name, professional_phone, request_reason, \
    diagnoses, triage_code, \
    departure_time, doctor_name, nurse_name, pilot_name, aircraft_registration, \
    assigned_user_id, complexity, patient_category, priority, \
    status, observations, epicrisis, \
    origin_hospital_id, destination_hospital_id, created_by, created_at, updated_at";

/// Listing columns: the transport (aliased `t`) plus display names.
const LIST_COLUMNS: &str = "t.id, t.transport_number, t.requested_at, t.transport_date, \
    t.patient_first_name, t.patient_last_name, t.patient_dni, t.patient_birth_date, \
    t.patient_age_years, t.patient_age_months, t.patient_age_days, t.patient_sex, \
    t.patient_weight_kg, t.patient_height_cm, t.patient_address, t.patient_locality, \
    t.has_coverage, t.coverage_number, \
    t.requesting_institution, t.professional_name, t.professional_phone, t.request_reason, \
    t.diagnoses, t.triage_code, \
    t.departure_time, t.doctor_name, t.nurse_name, t.pilot_name, t.aircraft_registration, \
    t.assigned_user_id, t.complexity, t.patient_category, t.priority, \
    t.status, t.observations, t.epicrisis, \
    t.origin_hospital_id, t.destination_hospital_id, t.created_by, t.created_at, t.updated_at, \
    oh.name AS origin_hospital_name, \
    dh.name AS destination_hospital_name, \
    cu.first_name || ' ' || cu.last_name AS created_by_name, \
    CASE WHEN au.id IS NULL THEN NULL ELSE au.first_name || ' ' || au.last_name END \
        AS assigned_user_name";

const LIST_FROM: &str = "FROM transport_requests t \
    LEFT JOIN hospitals oh ON oh.id = t.origin_hospital_id \
    LEFT JOIN hospitals dh ON dh.id = t.destination_hospital_id \
    JOIN users cu ON cu.id = t.created_by \
    LEFT JOIN users au ON au.id = t.assigned_user_id";

/// Default page size for listings.
const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on a single page.
const MAX_LIMIT: i64 = 200;

pub struct TransportRepo;

impl TransportRepo {
    /// Whether a transport number is already taken.
    pub async fn number_exists(pool: &PgPool, transport_number: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transport_requests WHERE transport_number = $1)",
        )
        .bind(transport_number)
        .fetch_one(pool)
        .await
    }

    /// Insert a new request in status `SOLICITADO`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransport,
    ) -> Result<TransportRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO transport_requests (
                transport_number, transport_date,
                patient_first_name, patient_last_name, patient_dni, patient_birth_date,
                patient_age_years, patient_age_months, patient_age_days, patient_sex,
                patient_weight_kg, patient_height_cm, patient_address, patient_locality,
                has_coverage, coverage_number,
                requesting_institution, professional_name, professional_phone,
                request_reason, diagnoses, triage_code,
                complexity, patient_category, priority, observations,
                origin_hospital_id, destination_hospital_id, created_by
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TransportRequest>(&query)
            .bind(&input.transport_number)
            .bind(input.transport_date)
            .bind(&input.patient_first_name)
            .bind(&input.patient_last_name)
            .bind(&input.patient_dni)
            .bind(input.patient_birth_date)
            .bind(input.patient_age.years)
            .bind(input.patient_age.months)
            .bind(input.patient_age.days)
            .bind(&input.patient_sex)
            .bind(input.patient_weight_kg)
            .bind(input.patient_height_cm)
            .bind(&input.patient_address)
            .bind(&input.patient_locality)
            .bind(input.has_coverage)
            .bind(&input.coverage_number)
            .bind(&input.requesting_institution)
            .bind(&input.professional_name)
            .bind(&input.professional_phone)
            .bind(&input.request_reason)
            .bind(&input.diagnoses)
            .bind(&input.triage_code)
            .bind(&input.complexity)
            .bind(&input.patient_category)
            .bind(&input.priority)
            .bind(&input.observations)
            .bind(input.origin_hospital_id)
            .bind(input.destination_hospital_id)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TransportRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transport_requests WHERE id = $1");
        sqlx::query_as::<_, TransportRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A single transport with its display names.
    pub async fn find_list_item(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TransportListItem>, sqlx::Error> {
        let query = format!("SELECT {LIST_COLUMNS} {LIST_FROM} WHERE t.id = $1");
        sqlx::query_as::<_, TransportListItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest requests first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        params: &TransportQuery,
    ) -> Result<Vec<TransportListItem>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {LIST_COLUMNS} {LIST_FROM}
             WHERE ($1::TEXT IS NULL OR t.status = $1)
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TransportListItem>(&query)
            .bind(&params.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Transports in any of `statuses`, most recently requested first.
    ///
    /// With `assigned_to`, only transports assigned to that user are returned.
    pub async fn list_by_statuses(
        pool: &PgPool,
        statuses: &[String],
        assigned_to: Option<DbId>,
    ) -> Result<Vec<TransportListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS} {LIST_FROM}
             WHERE t.status = ANY($1)
               AND ($2::BIGINT IS NULL OR t.assigned_user_id = $2)
             ORDER BY t.requested_at DESC, t.id DESC"
        );
        sqlx::query_as::<_, TransportListItem>(&query)
            .bind(statuses)
            .bind(assigned_to)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial edit and record it.
    ///
    /// Clearing `has_coverage` also clears `coverage_number`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTransport,
        note: &CreateTrackingEntry,
    ) -> Result<Option<TransportRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE transport_requests SET
                transport_date = COALESCE($2, transport_date),
                patient_first_name = COALESCE($3, patient_first_name),
                patient_last_name = COALESCE($4, patient_last_name),
                patient_dni = COALESCE($5, patient_dni),
                patient_birth_date = COALESCE($6, patient_birth_date),
                patient_age_years = COALESCE($7, patient_age_years),
                patient_age_months = COALESCE($8, patient_age_months),
                patient_age_days = COALESCE($9, patient_age_days),
                patient_sex = COALESCE($10, patient_sex),
                patient_weight_kg = COALESCE($11, patient_weight_kg),
                patient_height_cm = COALESCE($12, patient_height_cm),
                patient_address = COALESCE($13, patient_address),
                patient_locality = COALESCE($14, patient_locality),
                has_coverage = COALESCE($15, has_coverage),
                coverage_number = CASE
                    WHEN COALESCE($15, has_coverage) THEN COALESCE($16, coverage_number)
                    ELSE NULL
                END,
                requesting_institution = COALESCE($17, requesting_institution),
                professional_name = COALESCE($18, professional_name),
                professional_phone = COALESCE($19, professional_phone),
                request_reason = COALESCE($20, request_reason),
                diagnoses = COALESCE($21, diagnoses),
                triage_code = COALESCE($22, triage_code),
                complexity = COALESCE($23, complexity),
                patient_category = COALESCE($24, patient_category),
                priority = COALESCE($25, priority),
                observations = COALESCE($26, observations),
                origin_hospital_id = COALESCE($27, origin_hospital_id),
                destination_hospital_id = COALESCE($28, destination_hospital_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, TransportRequest>(&query)
            .bind(id)
            .bind(input.transport_date)
            .bind(&input.patient_first_name)
            .bind(&input.patient_last_name)
            .bind(&input.patient_dni)
            .bind(input.patient_birth_date)
            .bind(input.patient_age.map(|a| a.years))
            .bind(input.patient_age.map(|a| a.months))
            .bind(input.patient_age.map(|a| a.days))
            .bind(&input.patient_sex)
            .bind(input.patient_weight_kg)
            .bind(input.patient_height_cm)
            .bind(&input.patient_address)
            .bind(&input.patient_locality)
            .bind(input.has_coverage)
            .bind(&input.coverage_number)
            .bind(&input.requesting_institution)
            .bind(&input.professional_name)
            .bind(&input.professional_phone)
            .bind(&input.request_reason)
            .bind(&input.diagnoses)
            .bind(&input.triage_code)
            .bind(&input.complexity)
            .bind(&input.patient_category)
            .bind(&input.priority)
            .bind(&input.observations)
            .bind(input.origin_hospital_id)
            .bind(input.destination_hospital_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transport) = updated else {
            return Ok(None);
        };
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(Some(transport))
    }

    /// Set the status and record the change.
    ///
    /// The row is only updated while its status still equals `expected`, so
    /// the recorded "previous status" is always the one actually replaced.
    /// Returns `None` when the transport is missing or its status moved.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        next: &str,
        note: &CreateTrackingEntry,
    ) -> Result<Option<TransportRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE transport_requests SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, TransportRequest>(&query)
            .bind(id)
            .bind(expected)
            .bind(next)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transport) = updated else {
            return Ok(None);
        };
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(Some(transport))
    }

    /// Assign crew and aircraft and record the assignment.
    pub async fn assign_team(
        pool: &PgPool,
        id: DbId,
        team: &TeamAssignment,
        note: &CreateTrackingEntry,
    ) -> Result<Option<TransportRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE transport_requests SET
                departure_time = COALESCE($2, departure_time),
                doctor_name = COALESCE($3, doctor_name),
                nurse_name = COALESCE($4, nurse_name),
                pilot_name = COALESCE($5, pilot_name),
                aircraft_registration = COALESCE($6, aircraft_registration),
                assigned_user_id = COALESCE($7, assigned_user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, TransportRequest>(&query)
            .bind(id)
            .bind(team.departure_time)
            .bind(&team.doctor_name)
            .bind(&team.nurse_name)
            .bind(&team.pilot_name)
            .bind(&team.aircraft_registration)
            .bind(team.assigned_user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transport) = updated else {
            return Ok(None);
        };
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(Some(transport))
    }

    pub async fn update_epicrisis(
        pool: &PgPool,
        id: DbId,
        epicrisis: &str,
        note: &CreateTrackingEntry,
    ) -> Result<Option<TransportRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE transport_requests SET epicrisis = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, TransportRequest>(&query)
            .bind(id)
            .bind(epicrisis)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transport) = updated else {
            return Ok(None);
        };
        TrackingRepo::insert(&mut tx, note).await?;
        tx.commit().await?;
        Ok(Some(transport))
    }

    /// Delete a transport whose status is not in `protected_statuses`.
    /// Clinical rows and tracking entries cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_unless(
        pool: &PgPool,
        id: DbId,
        protected_statuses: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM transport_requests WHERE id = $1 AND NOT (status = ANY($2))")
                .bind(id)
                .bind(protected_statuses)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
