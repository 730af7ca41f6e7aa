use parcel_core::db::migrations::latest_version;
use parcel_core::db::open_db_in_memory;
use parcel_core::{
    created_at_now, Parcel, ParcelRepository, ParcelStatus, RepoError, SqliteParcelRepository,
};
use rand::Rng;
use rusqlite::Connection;
use std::collections::HashMap;

fn test_parcel() -> Parcel {
    Parcel {
        number: 0,
        client: 1000,
        status: ParcelStatus::Registered,
        address: "test".to_string(),
        created_at: created_at_now(),
    }
}

#[test]
fn add_get_delete_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let mut parcel = test_parcel();

    let id = store.add(&parcel).unwrap();
    assert!(id > 0);
    parcel.number = id;

    let loaded = store.get(id).unwrap();
    assert_eq!(loaded, parcel);

    store.delete(id).unwrap();
    let err = store.get(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(number) if number == id));
}

#[test]
fn add_ignores_input_number_and_assigns_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();

    let mut parcel = test_parcel();
    parcel.number = 424_242;
    let first = store.add(&parcel).unwrap();
    let second = store.add(&parcel).unwrap();

    assert_ne!(first, 424_242);
    assert_ne!(first, second);
}

#[test]
fn set_address_updates_only_address() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let parcel = test_parcel();
    let id = store.add(&parcel).unwrap();

    store.set_address(id, "new test address").unwrap();

    let loaded = store.get(id).unwrap();
    assert_eq!(loaded.address, "new test address");
    assert_eq!(loaded.client, parcel.client);
    assert_eq!(loaded.status, parcel.status);
    assert_eq!(loaded.created_at, parcel.created_at);
}

#[test]
fn set_status_accepts_every_status_without_transition_checks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let parcel = test_parcel();
    let id = store.add(&parcel).unwrap();

    for status in [
        ParcelStatus::Sent,
        ParcelStatus::Delivered,
        ParcelStatus::Registered,
    ] {
        store.set_status(id, status).unwrap();
        let loaded = store.get(id).unwrap();
        assert_eq!(loaded.status, status);
        assert_eq!(loaded.address, parcel.address);
        assert_eq!(loaded.created_at, parcel.created_at);
    }
}

#[test]
fn get_by_client_returns_exactly_the_clients_parcels() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();

    let client = rand::rng().random_range(1..10_000_000);
    let mut expected = HashMap::new();
    for i in 0..3 {
        let mut parcel = test_parcel();
        parcel.client = client;
        parcel.address = format!("address {i}");
        parcel.number = store.add(&parcel).unwrap();
        expected.insert(parcel.number, parcel);

        let mut other = test_parcel();
        other.client = client + 1;
        store.add(&other).unwrap();
    }

    let stored = store.get_by_client(client).unwrap();
    assert_eq!(stored.len(), expected.len());
    for parcel in &stored {
        assert_eq!(expected.get(&parcel.number), Some(parcel));
    }

    let numbers: Vec<_> = stored.iter().map(|parcel| parcel.number).collect();
    let mut sorted = numbers.clone();
    sorted.sort_unstable();
    assert_eq!(numbers, sorted);
}

#[test]
fn get_by_client_without_parcels_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    store.add(&test_parcel()).unwrap();

    assert!(store.get_by_client(7).unwrap().is_empty());
}

#[test]
fn unknown_number_is_not_found_for_every_operation() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();

    assert!(store.get(99).unwrap_err().is_not_found());
    assert!(store.set_address(99, "nowhere").unwrap_err().is_not_found());
    assert!(store
        .set_status(99, ParcelStatus::Sent)
        .unwrap_err()
        .is_not_found());
    assert!(store.delete(99).unwrap_err().is_not_found());
}

#[test]
fn deleted_parcel_cannot_be_deleted_twice() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();

    store.delete(id).unwrap();
    assert!(matches!(store.delete(id), Err(RepoError::NotFound(_))));
}

#[test]
fn address_is_stored_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let mut parcel = test_parcel();
    parcel.address = "'); DROP TABLE parcel; --".to_string();

    let id = store.add(&parcel).unwrap();
    assert_eq!(store.get(id).unwrap().address, parcel.address);
}

#[test]
fn invalid_persisted_status_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();

    // The CHECK constraint guards the column, so bypass it for this row.
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE parcel SET status = 'lost' WHERE number = ?1;", [id])
        .unwrap();

    let err = store.get(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("lost")));
}

#[test]
fn invalid_persisted_timestamp_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();

    conn.execute(
        "UPDATE parcel SET created_at = 'yesterday' WHERE number = ?1;",
        [id],
    )
    .unwrap();

    assert!(matches!(store.get(id), Err(RepoError::InvalidData(_))));
}

#[test]
fn add_rejects_malformed_timestamp_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    let existing = store.add(&test_parcel()).unwrap();

    let mut parcel = test_parcel();
    parcel.created_at = "2024-05-01 10:00:00".to_string();

    let err = store.add(&parcel).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("2024-05-01 10:00:00")));

    let stored = store.get_by_client(parcel.client).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].number, existing);
}

#[test]
fn write_failure_surfaces_as_db_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelRepository::try_new(&conn).unwrap();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    let err = store.add(&test_parcel()).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(!err.is_not_found());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteParcelRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_parcel_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteParcelRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("parcel"))
    ));
}

#[test]
fn repository_rejects_connection_missing_parcel_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteParcelRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "parcel",
            column: "created_at"
        })
    ));
}
