//! Tracking entry model. Entries are append-only (no `updated_at`).

use aerosamec_core::tracking::TrackingNote;
use aerosamec_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `tracking_entries` joined with its author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackingEntry {
    pub id: DbId,
    pub transport_id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
    pub recorded_at: Timestamp,
}

/// DTO for appending a tracking entry.
#[derive(Debug, Clone)]
pub struct CreateTrackingEntry {
    pub transport_id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub description: String,
    pub observations: Option<String>,
}

impl CreateTrackingEntry {
    /// Attribute a prepared note to `user_id` on `transport_id`.
    pub fn from_note(transport_id: DbId, user_id: DbId, note: TrackingNote) -> Self {
        Self {
            transport_id,
            user_id,
            kind: note.kind.as_str().to_string(),
            description: note.description,
            observations: note.observations,
        }
    }
}
