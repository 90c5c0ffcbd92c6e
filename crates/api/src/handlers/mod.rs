pub mod account;
pub mod auth;
pub mod clinical;
pub mod hospitals;
pub mod tracking;
pub mod transports;
pub mod users;
