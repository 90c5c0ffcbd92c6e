//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `GET /transports?status=&limit=&offset=`.
///
/// Limits are clamped in the repository layer.
#[derive(Debug, Default, Deserialize)]
pub struct TransportListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /transports/active?mine=`.
#[derive(Debug, Default, Deserialize)]
pub struct ActiveTransportParams {
    /// Only transports assigned to the caller.
    #[serde(default)]
    pub mine: bool,
}

/// `GET /auth/verify-email?token=`.
#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}
