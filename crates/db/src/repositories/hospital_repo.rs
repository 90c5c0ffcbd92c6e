//! Repository for the `hospitals` table.

use sqlx::PgPool;
use aerosamec_core::types::DbId;

use crate::models::hospital::{CreateHospital, Hospital, UpdateHospital};

const COLUMNS: &str = "id, name, address, city, province, phone, email, kind, is_active, \
                       created_at, updated_at";

pub struct HospitalRepo;

impl HospitalRepo {
    /// Insert a hospital. `kind` defaults to `PUBLICO` when absent.
    pub async fn create(pool: &PgPool, input: &CreateHospital) -> Result<Hospital, sqlx::Error> {
        let query = format!(
            "INSERT INTO hospitals (name, address, city, province, phone, email, kind)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'PUBLICO'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.kind)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE id = $1");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active hospitals ordered by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE is_active = true ORDER BY name");
        sqlx::query_as::<_, Hospital>(&query).fetch_all(pool).await
    }

    /// Update a hospital. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHospital,
    ) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!(
            "UPDATE hospitals SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                province = COALESCE($5, province),
                phone = COALESCE($6, phone),
                email = COALESCE($7, email),
                kind = COALESCE($8, kind),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.kind)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
