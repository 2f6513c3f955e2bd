// crates/folio-core/tests/proptest_validator.rs
// ============================================================================
// Module: Validator Property-Based Tests
// Description: Property tests for validator totality and stability.
// Purpose: Detect panics and invariant breaks across arbitrary payloads.
// ============================================================================

//! Property-based tests for validator invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use folio_core::AllowListLookup;
use folio_core::ReferenceSet;
use folio_core::validate;
use folio_core::validate_structure;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0 .. 4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn item_strategy() -> impl Strategy<Value = Value> {
    (
        prop_oneof![any::<i64>().prop_map(Value::from), json_value_strategy(1)],
        prop_oneof![any::<i64>().prop_map(Value::from), json_value_strategy(1)],
        prop_oneof![any::<i64>().prop_map(Value::from), json_value_strategy(1)],
        prop_oneof![".*".prop_map(Value::String), json_value_strategy(1)],
    )
        .prop_map(|(zzz, yyy, xxx, www)| json!({ "zzz": zzz, "yyy": yyy, "xxx": xxx, "www": www }))
}

proptest! {
    #[test]
    fn arbitrary_payloads_never_panic_and_stay_consistent(record in json_value_strategy(3)) {
        let result = validate_structure(&record);
        prop_assert_eq!(result.is_valid, result.errors.is_empty());
        prop_assert_eq!(validate_structure(&record), result);
    }

    #[test]
    fn plain_records_ignore_extra_fields(
        extras in prop::collection::btree_map("[e-z]{4,8}", json_value_strategy(2), 0 .. 6),
    ) {
        let mut record = Map::new();
        for (key, value) in extras {
            record.insert(key, value);
        }
        record.insert("aaa".to_string(), json!("2024-05-01T10:00:00Z"));
        record.insert("bbb".to_string(), json!("Dune"));
        record.insert("ccc".to_string(), json!(10));
        let result = validate_structure(&Value::Object(record));
        prop_assert!(result.is_valid);
        prop_assert!(result.errors.is_empty());
    }

    #[test]
    fn item_errors_are_ordered_by_index(items in prop::collection::vec(item_strategy(), 0 .. 6)) {
        let record = json!({ "aaa": "2024-05-01", "bbb": "Dune", "ccc": 11, "ddd": items });
        let lookup = AllowListLookup::new().with_ids(ReferenceSet::Zzz, [1, 2, 3]);
        let result = validate(&record, Some(&lookup)).unwrap();
        let indices: Vec<usize> = result
            .errors
            .iter()
            .map(|error| {
                let rest = error.property.strip_prefix("ddd[").expect("item path");
                rest.split(']').next().and_then(|index| index.parse().ok()).expect("index")
            })
            .collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        prop_assert_eq!(indices, sorted);
    }
}
