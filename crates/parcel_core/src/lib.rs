//! Core persistence and workflow logic for the parcel tracker.
//!
//! Callers open a connection with [`db::open_db`], bind a
//! [`SqliteParcelRepository`] to it, and optionally wrap that in a
//! [`ParcelService`] to get lifecycle rules enforced.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::parcel::{
    created_at_now, ClientId, Parcel, ParcelNumber, ParcelStatus, ParseParcelStatusError,
};
pub use repo::parcel_repo::{ParcelRepository, RepoError, RepoResult, SqliteParcelRepository};
pub use service::parcel_service::{ParcelService, ParcelServiceError, ParcelServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
