use parcel_core::{Parcel, ParcelStatus};

#[test]
fn parcel_new_starts_registered_and_unnumbered() {
    let parcel = Parcel::new(1000, "test");

    assert_eq!(parcel.number, 0);
    assert_eq!(parcel.client, 1000);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    assert_eq!(parcel.address, "test");
    assert_eq!(parcel.created_at.len(), "2024-01-01T00:00:00Z".len());
    assert!(parcel.created_at.ends_with('Z'));
}

#[test]
fn parcel_serialization_uses_storage_status_tokens() {
    let parcel = Parcel {
        number: 12,
        client: 34,
        status: ParcelStatus::Sent,
        address: "Lenina 1".to_string(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
    };

    let json = serde_json::to_value(&parcel).unwrap();
    assert_eq!(json["number"], 12);
    assert_eq!(json["client"], 34);
    assert_eq!(json["status"], "sent");
    assert_eq!(json["address"], "Lenina 1");
    assert_eq!(json["created_at"], "2024-05-01T10:00:00Z");

    let decoded: Parcel = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, parcel);
}

#[test]
fn deserialize_rejects_unknown_status() {
    let value = serde_json::json!({
        "number": 1,
        "client": 1,
        "status": "lost",
        "address": "x",
        "created_at": "2024-05-01T10:00:00Z"
    });

    assert!(serde_json::from_value::<Parcel>(value).is_err());
}

#[test]
fn parcels_differing_in_one_field_are_not_equal() {
    let parcel = Parcel::new(1, "a");
    let mut moved = parcel.clone();
    moved.address = "b".to_string();

    assert_ne!(parcel, moved);
}
