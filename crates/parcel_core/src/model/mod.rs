//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical parcel record moved across the store boundary.
//! - Define the closed status vocabulary and its lifecycle order.
//!
//! # Invariants
//! - A parcel is identified by its store-assigned `ParcelNumber`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod parcel;
