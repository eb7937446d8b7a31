//! Basic Operations Tests
//!
//! Unguarded (no etag) get, set and delete:
//! - get: missing keys are `None`, never an error
//! - set: insert and overwrite
//! - delete: removes the row, missing keys are fine
//! - value shapes: anything JSON can hold

use super::*;
use serde_json::json;
use statestore::{DeleteRequest, Error, SetRequest};

// =============================================================================
// GET TESTS
// =============================================================================

#[test]
fn test_get_never_written_key_is_none() {
    let store = quick_setup();
    let result = store.get("never-written").expect("get should succeed");
    assert!(result.is_none());
}

#[test]
fn test_get_empty_key_is_invalid() {
    let store = quick_setup();
    assert!(matches!(store.get("").unwrap_err(), Error::InvalidKey(_)));
}

// =============================================================================
// SET TESTS
// =============================================================================

#[test]
fn test_set_then_get_returns_value_and_etag() {
    let store = quick_setup();
    let etag = store
        .set(&SetRequest::new("k", json!("v")).with_etag(""))
        .expect("set with empty etag should succeed");

    let record = store.get("k").unwrap().expect("key should exist");
    assert_eq!(record.key, "k");
    assert_eq!(record.value, json!("v"));
    assert!(!record.etag.as_str().is_empty());
    assert_eq!(record.etag, etag);
}

#[test]
fn test_unguarded_set_overwrites() {
    let store = quick_setup();
    let e1 = store.set(&SetRequest::new("k", json!(1))).unwrap();
    let e2 = store.set(&SetRequest::new("k", json!(2))).unwrap();
    assert_ne!(e1, e2);

    let record = store.get("k").unwrap().unwrap();
    assert_eq!(record.value, json!(2));
    assert_eq!(record.etag, e2);
}

#[test]
fn test_set_typed_value() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Profile {
        name: String,
        age: u32,
    }

    let store = quick_setup();
    let profile = Profile {
        name: "Alice".into(),
        age: 30,
    };
    store
        .set(&SetRequest::from_serializable("user:1", &profile).unwrap())
        .unwrap();

    let back: Profile = store.get("user:1").unwrap().unwrap().value_as().unwrap();
    assert_eq!(back, profile);
}

#[test]
fn test_value_shapes_survive() {
    let store = quick_setup();
    let values = [
        json!(null),
        json!(true),
        json!(-42),
        json!(3.5),
        json!("text with 'quotes' and \"doubles\""),
        json!([1, "two", {"three": 3}]),
        json!({"nested": {"deep": [null, false]}}),
        json!("unicode: héllo 世界"),
    ];

    for (i, value) in values.iter().enumerate() {
        let key = format!("shape-{i}");
        store.set(&SetRequest::new(&key, value.clone())).unwrap();
        assert_eq!(&store.get(&key).unwrap().unwrap().value, value);
    }
}

#[test]
fn test_keys_are_distinct() {
    let store = quick_setup();
    store.set(&SetRequest::new("a", json!(1))).unwrap();
    store.set(&SetRequest::new("A", json!(2))).unwrap();
    store.set(&SetRequest::new("a ", json!(3))).unwrap();

    assert_eq!(store.get("a").unwrap().unwrap().value, json!(1));
    assert_eq!(store.get("A").unwrap().unwrap().value, json!(2));
    assert_eq!(store.get("a ").unwrap().unwrap().value, json!(3));
}

// =============================================================================
// DELETE TESTS
// =============================================================================

#[test]
fn test_delete_removes_row() {
    let store = quick_setup();
    store.set(&SetRequest::new("k", json!(1))).unwrap();
    store.delete(&DeleteRequest::new("k")).unwrap();
    assert!(store.get("k").unwrap().is_none());
}

#[test]
fn test_delete_missing_key_without_etag_succeeds() {
    let store = quick_setup();
    store
        .delete(&DeleteRequest::new("ghost").with_etag(""))
        .expect("unguarded delete of missing key should succeed");
}

#[test]
fn test_recreate_after_delete_gets_fresh_etag() {
    let store = quick_setup();
    let e1 = store.set(&SetRequest::new("k", json!(1))).unwrap();
    store.delete(&DeleteRequest::new("k")).unwrap();
    let e2 = store.set(&SetRequest::new("k", json!(1))).unwrap();
    assert_ne!(e1, e2);
}

#[test]
fn test_data_persists_across_reopen() {
    let db = TestDb::new();
    let etag = {
        let store = db.open();
        let etag = store.set(&SetRequest::new("durable", json!({"n": 1}))).unwrap();
        store.close().unwrap();
        etag
    };

    let store = db.open();
    let record = store.get("durable").unwrap().unwrap();
    assert_eq!(record.value, json!({"n": 1}));
    assert_eq!(record.etag, etag);
}
