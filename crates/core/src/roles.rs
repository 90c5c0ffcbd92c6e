//! Access roles.
//!
//! The codes must match the `CHECK` constraint on `users.role` in
//! `20250101000001_create_users.sql`.

use crate::codes::define_code_enum;

define_code_enum! {
    /// What a user may do.
    ///
    /// - `Admin` manages users and hospitals and can do everything else.
    /// - `Coordinator` creates, edits, staffs and deletes transports.
    /// - `Operator` works the in-flight view: status, clinical entries, epicrisis.
    UserRole {
        Admin = "ADMIN",
        Coordinator = "COORDINADOR",
        Operator = "OPERARIO",
    }
}

impl UserRole {
    /// Whether this role may manage transport requests (create/edit/staff/delete).
    pub fn can_coordinate(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coordinator)
    }
}
