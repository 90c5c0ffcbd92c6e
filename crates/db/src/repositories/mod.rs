//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Mutations that must leave a
//! tracking entry open a transaction and write both rows in it.

pub mod clinical_repo;
pub mod hospital_repo;
pub mod session_repo;
pub mod tracking_repo;
pub mod transport_repo;
pub mod user_repo;

pub use clinical_repo::ClinicalRepo;
pub use hospital_repo::HospitalRepo;
pub use session_repo::SessionRepo;
pub use tracking_repo::TrackingRepo;
pub use transport_repo::TransportRepo;
pub use user_repo::UserRepo;
