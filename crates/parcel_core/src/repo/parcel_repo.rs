//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete APIs over the `parcel` table.
//! - Map SQLite failures and missing rows to `RepoError`.
//!
//! # Invariants
//! - The repository borrows the connection; it never opens or closes one.
//! - Statements are parameterized; caller input is never spliced into SQL.
//! - Write and read paths agree on valid state: `add` refuses what
//!   `parse_parcel_row` would reject.
//! - `set_address`, `set_status` and `delete` report `NotFound` when no row
//!   matched.
//! - Status transitions are not validated here (see `ParcelService`).

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::parcel::{is_valid_created_at, ClientId, Parcel, ParcelNumber, ParcelStatus};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// The backing store rejected or could not execute a statement.
    Db(DbError),
    /// No parcel row has this number.
    NotFound(ParcelNumber),
    /// A stored row violates the parcel model.
    InvalidData(String),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this is the distinguished not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for parcel records.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the store-assigned number.
    /// `parcel.number` is ignored. A `created_at` that is not RFC 3339 is
    /// rejected with `RepoError::InvalidData` before anything is written.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel, or `RepoError::NotFound`.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists every parcel owned by `client` in ascending number order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository bound to a caller-owned connection.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this repository queries.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        if !is_valid_created_at(&parcel.created_at) {
            return Err(RepoError::InvalidData(format!(
                "invalid timestamp `{}` for parcel.created_at; expected RFC 3339",
                parcel.created_at
            )));
        }

        let number = self.conn.query_row(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING number;",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
            |row| row.get::<_, ParcelNumber>(0),
        )?;

        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let mut rows = stmt.query([number])?;
        match rows.next()? {
            Some(row) => parse_parcel_row(row),
            None => Err(RepoError::NotFound(number)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARCEL_SELECT_SQL} WHERE client = ?1 ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2;",
            params![address, number],
        )?;
        require_changed(changed, number)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status.as_str(), number],
        )?;
        require_changed(changed, number)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM parcel WHERE number = ?1;", [number])?;
        require_changed(changed, number)
    }
}

fn require_changed(changed: usize, number: ParcelNumber) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound(number));
    }
    Ok(())
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let number: ParcelNumber = row.get("number")?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<ParcelStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in parcel.status (number={number})"
        ))
    })?;

    let created_at: String = row.get("created_at")?;
    if !is_valid_created_at(&created_at) {
        return Err(RepoError::InvalidData(format!(
            "invalid timestamp `{created_at}` in parcel.created_at (number={number})"
        )));
    }

    Ok(Parcel {
        number,
        client: row.get("client")?,
        status,
        address: row.get("address")?,
        created_at,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [PARCEL_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([PARCEL_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in PARCEL_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}
