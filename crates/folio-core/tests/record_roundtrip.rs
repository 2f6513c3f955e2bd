// crates/folio-core/tests/record_roundtrip.rs
// ============================================================================
// Module: Typed Record Round-Trip Tests
// Description: Typed conversion of validated payloads.
// Purpose: Ensure valid payloads validate identically after a serde round trip.
// ============================================================================

//! Typed record conversion and round-trip tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use folio_core::InputRecord;
use folio_core::ItemRecord;
use folio_core::RecordError;
use folio_core::validate_structure;
use serde_json::json;

#[test]
fn itemized_record_round_trips_through_typed_form() {
    let payload = json!({
        "aaa": "2024-05-01T10:00:00Z",
        "bbb": "Dune",
        "ccc": 11,
        "ddd": [{ "zzz": 1, "yyy": 2, "xxx": 3, "www": "hardcover" }],
        "shelf": "B2"
    });
    let typed = InputRecord::from_value(&payload).expect("valid payload");
    assert_eq!(typed.ddd, Some(vec![ItemRecord {
        zzz: 1,
        yyy: 2,
        xxx: 3,
        www: "hardcover".to_string(),
    }]));
    assert_eq!(typed.extra.get("shelf"), Some(&json!("B2")));

    let encoded = serde_json::to_string(&typed.to_value().expect("encode")).expect("text");
    let decoded: serde_json::Value = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(decoded, payload);
    assert_eq!(validate_structure(&decoded), validate_structure(&payload));
}

#[test]
fn plain_record_drops_irrelevant_items() {
    let payload = json!({ "aaa": "2024-05-01", "bbb": "Dune", "ccc": 10, "ddd": "ignored" });
    let typed = InputRecord::from_value(&payload).expect("valid payload");
    assert_eq!(typed.ddd, None);
    assert!(typed.extra.is_empty());
    assert!(validate_structure(&typed.to_value().unwrap()).is_valid);
}

#[test]
fn invalid_payload_returns_full_result() {
    let payload = json!({ "aaa": "2024-05-01", "bbb": "Dune", "ccc": 11 });
    match InputRecord::from_value(&payload) {
        Err(RecordError::Invalid(result)) => {
            assert_eq!(result.properties().collect::<Vec<_>>(), vec!["ddd"]);
        }
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("expected invalid record"),
    }
}
