use std::sync::Arc;

use aerosamec_notify::Notifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aerosamec_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Account email sender (SMTP or log-only).
    pub notifier: Arc<Notifier>,
}
