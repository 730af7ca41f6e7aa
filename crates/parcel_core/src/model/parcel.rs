//! Parcel domain model.
//!
//! # Responsibility
//! - Define the parcel record and its status state machine.
//! - Own the textual `created_at` format shared by all write paths.
//!
//! # Invariants
//! - `status` is always one of `registered|sent|delivered`.
//! - Storage and serde tokens are the lowercase forms of the variant names
//!   (`Registered` is stored as `registered`); capitalized tokens are rejected.
//! - Status only moves forward: `Registered -> Sent -> Delivered`.
//! - `created_at` is UTC RFC 3339 with second precision (`...Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Opaque owner identifier. Not validated by core.
pub type ClientId = i64;

/// Lifecycle stage of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted, not yet handed to transport. Initial state.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient. Terminal state.
    Delivered,
}

impl ParcelStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ParcelStatus; 3] = [Self::Registered, Self::Sent, Self::Delivered];

    /// Returns the storage/wire token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Returns the following lifecycle stage, or `None` at the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status token is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseParcelStatusError(pub String);

impl Display for ParseParcelStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown parcel status `{}`; expected registered|sent|delivered",
            self.0
        )
    }
}

impl Error for ParseParcelStatusError {}

impl FromStr for ParcelStatus {
    type Err = ParseParcelStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            other => Err(ParseParcelStatusError(other.to_string())),
        }
    }
}

/// Canonical parcel record.
///
/// Plain data: two parcels are equal only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Assigned by the store on insert. Ignored by `add`.
    pub number: ParcelNumber,
    /// Owning client. Immutable after creation.
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Free-form delivery address. Callers may only change it while registered.
    pub address: String,
    /// Creation time, see [`created_at_now`]. Never modified after insert.
    pub created_at: String,
}

impl Parcel {
    /// Creates a not-yet-stored parcel in the initial `Registered` state.
    ///
    /// # Invariants
    /// - `number` is `0` until the store assigns one.
    /// - `created_at` is stamped with the current UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at_now(),
        }
    }
}

/// Current UTC time in the persisted `created_at` format.
pub fn created_at_now() -> String {
    format_created_at(Utc::now())
}

pub(crate) fn format_created_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Returns whether `value` is a well-formed RFC 3339 timestamp.
pub(crate) fn is_valid_created_at(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
}
