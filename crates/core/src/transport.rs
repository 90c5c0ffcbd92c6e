//! Transport request lifecycle.
//!
//! The status field follows a nominal progression
//!
//! ```text
//! SOLICITADO -> ASIGNADO -> EN_PREPARACION -> EN_CURSO -> COMPLETADO
//!                                   (any) -> CANCELADO
//! ```
//!
//! but transitions are not guarded: dispatch corrects mistakes by setting
//! whatever status is right, so any status may follow any other. What is
//! enforced is that every change is recorded (see [`crate::tracking`]).

use rand::Rng;

use crate::codes::define_code_enum;

/// Prefix of every transport number.
pub const TRANSPORT_NUMBER_PREFIX: &str = "TRA";

/// Attempts at drawing an unused transport number before giving up.
pub const MAX_NUMBER_ATTEMPTS: usize = 20;

define_code_enum! {
    /// Status of a transport request.
    TransportStatus {
        Requested = "SOLICITADO",
        Assigned = "ASIGNADO",
        Preparing = "EN_PREPARACION",
        InProgress = "EN_CURSO",
        Completed = "COMPLETADO",
        Cancelled = "CANCELADO",
    }
}

impl TransportStatus {
    /// Statuses shown on the operator (in-flight) board.
    pub const OPERATOR_VISIBLE: &'static [TransportStatus] = &[
        TransportStatus::Assigned,
        TransportStatus::Preparing,
        TransportStatus::InProgress,
    ];

    /// Position in the nominal progression. `Cancelled` sits outside it.
    fn rank(self) -> Option<u8> {
        match self {
            TransportStatus::Requested => Some(0),
            TransportStatus::Assigned => Some(1),
            TransportStatus::Preparing => Some(2),
            TransportStatus::InProgress => Some(3),
            TransportStatus::Completed => Some(4),
            TransportStatus::Cancelled => None,
        }
    }

    /// Transports that are flying or finished keep their clinical record and
    /// cannot be deleted.
    pub fn is_deletable(self) -> bool {
        !matches!(self, TransportStatus::InProgress | TransportStatus::Completed)
    }

    /// Whether `next` moves backwards along the nominal progression (or
    /// re-opens a cancelled transport). Such changes are allowed but logged.
    pub fn is_regression(self, next: TransportStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to < from,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

/// Render a transport number such as `TRA-2025-4821`.
pub fn format_transport_number(year: i32, sequence: u16) -> String {
    format!("{TRANSPORT_NUMBER_PREFIX}-{year}-{sequence:04}")
}

/// Draw a random candidate number for `year`. The caller checks uniqueness.
pub fn random_transport_number(year: i32) -> String {
    let sequence: u16 = rand::rng().random_range(1000..=9999);
    format_transport_number(year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_board_statuses() {
        assert!(!TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::Requested));
        assert!(TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::Assigned));
        assert!(TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::Preparing));
        assert!(TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::InProgress));
        assert!(!TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::Completed));
        assert!(!TransportStatus::OPERATOR_VISIBLE.contains(&TransportStatus::Cancelled));
    }

    #[test]
    fn in_progress_and_completed_cannot_be_deleted() {
        assert!(TransportStatus::Requested.is_deletable());
        assert!(TransportStatus::Cancelled.is_deletable());
        assert!(!TransportStatus::InProgress.is_deletable());
        assert!(!TransportStatus::Completed.is_deletable());
    }

    #[test]
    fn regression_detection() {
        use TransportStatus::*;
        assert!(!Requested.is_regression(Assigned));
        assert!(!Requested.is_regression(Completed));
        assert!(InProgress.is_regression(Assigned));
        assert!(Cancelled.is_regression(Requested));
        assert!(!Preparing.is_regression(Cancelled));
        assert!(!Assigned.is_regression(Assigned));
    }

    #[test]
    fn transport_number_format() {
        assert_eq!(format_transport_number(2024, 1), "TRA-2024-0001");
        let random = random_transport_number(2025);
        assert!(random.starts_with("TRA-2025-"));
        let seq: u16 = random.rsplit('-').next().unwrap().parse().unwrap();
        assert!((1000..=9999).contains(&seq));
    }
}
