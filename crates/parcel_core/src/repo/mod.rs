//! Repository layer for parcel persistence.
//!
//! # Responsibility
//! - Define the data access contract used by the parcel use-case layer.
//! - Keep SQLite statements inside the core persistence boundary.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.
//! - Every operation issues exactly one statement; nothing is cached.

pub mod parcel_repo;
