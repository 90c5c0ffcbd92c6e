//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where rows are editable
//!
//! Enumerated columns are carried as their stored `String` codes; the API
//! layer parses them into `aerosamec_core` enums at the boundary.

pub mod clinical;
pub mod hospital;
pub mod session;
pub mod tracking;
pub mod transport;
pub mod user;
