//! Parcel use-case service.
//!
//! # Responsibility
//! - Register parcels, advance their status, change addresses, delete them.
//! - Enforce the lifecycle rules the repository deliberately leaves open.
//!
//! # Invariants
//! - Status only moves forward along `ParcelStatus::next`.
//! - Address changes and deletion are allowed only while `Registered`.
//! - Log lines carry ids and statuses, never addresses.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ParcelServiceResult<T> = Result<T, ParcelServiceError>;

/// Service error for parcel use-cases.
#[derive(Debug)]
pub enum ParcelServiceError {
    /// Target parcel does not exist.
    ParcelNotFound(ParcelNumber),
    /// Address can only change while the parcel is registered.
    AddressLocked {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Only registered parcels can be deleted.
    DeleteForbidden {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Parcel is already in the terminal state.
    AlreadyDelivered(ParcelNumber),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ParcelServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParcelNotFound(number) => write!(f, "parcel not found: {number}"),
            Self::AddressLocked { number, status } => write!(
                f,
                "cannot change address of parcel {number} in status `{status}`; only `registered` parcels can be changed"
            ),
            Self::DeleteForbidden { number, status } => write!(
                f,
                "cannot delete parcel {number} in status `{status}`; only `registered` parcels can be deleted"
            ),
            Self::AlreadyDelivered(number) => write!(f, "parcel {number} is already delivered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParcelServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ParcelServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(number) => Self::ParcelNotFound(number),
            other => Self::Repo(other),
        }
    }
}

/// Use-case wrapper around a parcel repository.
///
/// Guards read the parcel and then write it in a separate statement; they are
/// not atomic and assume a single writer per database.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns it with its number.
    pub fn register(
        &self,
        client: ClientId,
        address: impl Into<String>,
    ) -> ParcelServiceResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel).inspect_err(|err| {
            warn!("event=parcel_register module=parcel status=error client={client} error={err}");
        })?;
        info!(
            "event=parcel_register module=parcel status=ok number={} client={client}",
            parcel.number
        );
        Ok(parcel)
    }

    /// Gets one parcel by number.
    pub fn get(&self, number: ParcelNumber) -> ParcelServiceResult<Parcel> {
        let parcel = self.repo.get(number).inspect_err(|err| {
            warn!("event=parcel_get module=parcel status=error number={number} error={err}");
        })?;
        debug!(
            "event=parcel_get module=parcel status=ok number={number} parcel_status={}",
            parcel.status
        );
        Ok(parcel)
    }

    /// Lists all parcels of `client` in ascending number order.
    pub fn client_parcels(&self, client: ClientId) -> ParcelServiceResult<Vec<Parcel>> {
        let parcels = self.repo.get_by_client(client).inspect_err(|err| {
            warn!("event=parcel_list module=parcel status=error client={client} error={err}");
        })?;
        debug!(
            "event=parcel_list module=parcel status=ok client={client} count={}",
            parcels.len()
        );
        Ok(parcels)
    }

    /// Moves the parcel one step along the lifecycle and returns the new status.
    ///
    /// # Errors
    /// - `AlreadyDelivered` when the parcel is in the terminal state.
    pub fn next_status(&self, number: ParcelNumber) -> ParcelServiceResult<ParcelStatus> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            warn!(
                "event=parcel_next_status module=parcel status=error number={number} error_code=already_delivered"
            );
            return Err(ParcelServiceError::AlreadyDelivered(number));
        };

        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=parcel status=ok number={number} from={} to={next}",
            parcel.status
        );
        Ok(next)
    }

    /// Replaces the address of a registered parcel.
    pub fn change_address(
        &self,
        number: ParcelNumber,
        address: &str,
    ) -> ParcelServiceResult<()> {
        let parcel = self.repo.get(number)?;
        if parcel.status != ParcelStatus::Registered {
            warn!(
                "event=parcel_change_address module=parcel status=error number={number} error_code=address_locked parcel_status={}",
                parcel.status
            );
            return Err(ParcelServiceError::AddressLocked {
                number,
                status: parcel.status,
            });
        }

        self.repo.set_address(number, address)?;
        info!("event=parcel_change_address module=parcel status=ok number={number}");
        Ok(())
    }

    /// Deletes a registered parcel.
    pub fn delete(&self, number: ParcelNumber) -> ParcelServiceResult<()> {
        let parcel = self.repo.get(number)?;
        if parcel.status != ParcelStatus::Registered {
            warn!(
                "event=parcel_delete module=parcel status=error number={number} error_code=delete_forbidden parcel_status={}",
                parcel.status
            );
            return Err(ParcelServiceError::DeleteForbidden {
                number,
                status: parcel.status,
            });
        }

        self.repo.delete(number)?;
        info!("event=parcel_delete module=parcel status=ok number={number}");
        Ok(())
    }
}
