//! Domain logic for the AeroSAMEC air-transport coordination backend.
//!
//! This crate has no I/O: everything here is pure and unit-tested, so the
//! repository and HTTP layers can share the same rules.

pub mod age;
pub mod clinical;
pub mod codes;
pub mod error;
pub mod formatting;
pub mod hashing;
pub mod roles;
pub mod tokens;
pub mod tracking;
pub mod transport;
pub mod types;
