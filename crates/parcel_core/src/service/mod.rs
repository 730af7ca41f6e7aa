//! Parcel use-case services.
//!
//! # Responsibility
//! - Enforce the parcel workflow on top of the storage-only repository.
//! - Keep CLI layers decoupled from storage details.

pub mod parcel_service;
