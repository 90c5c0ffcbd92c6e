//! Repository for the append-only `tracking_entries` table.

use sqlx::{PgConnection, PgPool};
use aerosamec_core::types::DbId;

use crate::models::tracking::{CreateTrackingEntry, TrackingEntry};

/// Columns selected from `tracking_entries` (aliased `e`) joined with the
/// author (aliased `u`).
const COLUMNS: &str = "e.id, e.transport_id, e.user_id, \
                       u.first_name || ' ' || u.last_name AS user_name, \
                       e.kind, e.description, e.observations, e.recorded_at";

/// Tracking entries are inserted and read, never updated or deleted.
pub struct TrackingRepo;

impl TrackingRepo {
    /// Append a standalone entry (manual notes).
    pub async fn create(
        pool: &PgPool,
        input: &CreateTrackingEntry,
    ) -> Result<TrackingEntry, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, input).await
    }

    /// Append an entry on an existing connection, typically inside the
    /// transaction of the mutation it describes.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateTrackingEntry,
    ) -> Result<TrackingEntry, sqlx::Error> {
        let query = format!(
            "WITH e AS (
                INSERT INTO tracking_entries (transport_id, user_id, kind, description, observations)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {COLUMNS} FROM e JOIN users u ON u.id = e.user_id"
        );
        sqlx::query_as::<_, TrackingEntry>(&query)
            .bind(input.transport_id)
            .bind(input.user_id)
            .bind(&input.kind)
            .bind(&input.description)
            .bind(&input.observations)
            .fetch_one(conn)
            .await
    }

    /// All entries of a transport, oldest first.
    pub async fn list_for_transport(
        pool: &PgPool,
        transport_id: DbId,
    ) -> Result<Vec<TrackingEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tracking_entries e
             JOIN users u ON u.id = e.user_id
             WHERE e.transport_id = $1
             ORDER BY e.recorded_at ASC, e.id ASC"
        );
        sqlx::query_as::<_, TrackingEntry>(&query)
            .bind(transport_id)
            .fetch_all(pool)
            .await
    }
}
