//! Bulk Operations Tests
//!
//! All-or-nothing batches:
//! - bulk_set / bulk_delete: every item or none
//! - transact: mixed Set/Delete in one transaction
//! - bulk_get: per-key results in input order
//! - empty batches are no-ops

use super::*;
use serde_json::json;
use statestore::{DeleteRequest, ETag, Error, Operation, SetRequest, Version};

// =============================================================================
// BULK SET
// =============================================================================

#[test]
fn test_bulk_set_writes_every_item() {
    let store = quick_setup();
    let requests: Vec<SetRequest> = (0..10)
        .map(|i| SetRequest::new(format!("key-{i}"), json!({"i": i})))
        .collect();

    let etags = store.bulk_set(&requests).unwrap();
    assert_eq!(etags.len(), 10);

    for (i, etag) in etags.iter().enumerate() {
        let record = store.get(&format!("key-{i}")).unwrap().unwrap();
        assert_eq!(record.value, json!({"i": i}));
        assert_eq!(&record.etag, etag);
    }
}

#[test]
fn test_bulk_set_with_invalid_item_writes_nothing() {
    let store = quick_setup();
    let err = store
        .bulk_set(&[
            SetRequest::new("good", json!("ok")),
            SetRequest::new("bad", json!("nope")).with_etag("12345"),
        ])
        .unwrap_err();
    assert!(err.is_validation());

    assert!(store.get("good").unwrap().is_none());
    assert!(store.get("bad").unwrap().is_none());
}

#[test]
fn test_bulk_set_conflict_preserves_existing_rows() {
    let store = quick_setup();
    let e_a = store.set(&SetRequest::new("a", json!("a0"))).unwrap();
    let e_b = store.set(&SetRequest::new("b", json!("b0"))).unwrap();

    let stale = ETag::from(Version::generate());
    let err = store
        .bulk_set(&[
            SetRequest::new("a", json!("a1")).with_etag(&e_a),
            SetRequest::new("b", json!("b1")).with_etag(&stale),
        ])
        .unwrap_err();
    assert!(err.is_conflict());

    let a = store.get("a").unwrap().unwrap();
    let b = store.get("b").unwrap().unwrap();
    assert_eq!((a.value, a.etag), (json!("a0"), e_a));
    assert_eq!((b.value, b.etag), (json!("b0"), e_b));
}

#[test]
fn test_bulk_set_same_key_twice_keeps_last() {
    let store = quick_setup();
    let etags = store
        .bulk_set(&[
            SetRequest::new("k", json!(1)),
            SetRequest::new("k", json!(2)),
        ])
        .unwrap();
    assert_ne!(etags[0], etags[1]);

    let record = store.get("k").unwrap().unwrap();
    assert_eq!(record.value, json!(2));
    assert_eq!(record.etag, etags[1]);
}

// =============================================================================
// BULK DELETE
// =============================================================================

#[test]
fn test_bulk_delete_removes_every_item() {
    let store = quick_setup();
    let etags = store
        .bulk_set(&[
            SetRequest::new("a", json!(1)),
            SetRequest::new("b", json!(2)),
            SetRequest::new("c", json!(3)),
        ])
        .unwrap();

    store
        .bulk_delete(&[
            DeleteRequest::new("a").with_etag(&etags[0]),
            DeleteRequest::new("b"),
            DeleteRequest::new("never-existed"),
        ])
        .unwrap();

    assert!(store.get("a").unwrap().is_none());
    assert!(store.get("b").unwrap().is_none());
    assert!(store.get("c").unwrap().is_some());
}

#[test]
fn test_bulk_delete_with_malformed_etag_deletes_nothing() {
    let store = quick_setup();
    store
        .bulk_set(&[
            SetRequest::new("a", json!(1)),
            SetRequest::new("b", json!(2)),
        ])
        .unwrap();

    let err = store
        .bulk_delete(&[
            DeleteRequest::new("a"),
            DeleteRequest::new("b").with_etag("1234"),
        ])
        .unwrap_err();
    assert!(matches!(err, Error::MalformedETag { .. }));

    assert!(store.get("a").unwrap().is_some());
    assert!(store.get("b").unwrap().is_some());
}

// =============================================================================
// TRANSACT
// =============================================================================

#[test]
fn test_transact_mixed_operations() {
    let store = quick_setup();
    let e_old = store.set(&SetRequest::new("old", json!("x"))).unwrap();

    let results = store
        .transact(&[
            Operation::Set(SetRequest::new("new", json!("y"))),
            Operation::Delete(DeleteRequest::new("old").with_etag(&e_old)),
        ])
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].as_ref(),
        Some(&store.get("new").unwrap().unwrap().etag)
    );
    assert!(results[1].is_none());
    assert!(store.get("old").unwrap().is_none());
}

#[test]
fn test_transact_failure_rolls_back_earlier_items() {
    let store = quick_setup();
    let e_keep = store.set(&SetRequest::new("keep", json!(1))).unwrap();

    let err = store
        .transact(&[
            Operation::Set(SetRequest::new("added", json!(1))),
            Operation::Delete(DeleteRequest::new("keep")),
            Operation::Delete(DeleteRequest::new("ghost").with_etag(&e_keep)),
        ])
        .unwrap_err();
    assert!(err.is_conflict());

    assert!(store.get("added").unwrap().is_none());
    assert_eq!(store.get("keep").unwrap().unwrap().etag, e_keep);
}

#[test]
fn test_transact_operations_deserialize_from_json() {
    let store = quick_setup();
    let ops: Vec<Operation> = serde_json::from_value(json!([
        {"operation": "set", "key": "a", "value": {"n": 1}},
        {"operation": "set", "key": "b", "value": [1, 2]},
        {"operation": "delete", "key": "a"}
    ]))
    .unwrap();

    store.transact(&ops).unwrap();
    assert!(store.get("a").unwrap().is_none());
    assert_eq!(store.get("b").unwrap().unwrap().value, json!([1, 2]));
}

// =============================================================================
// BULK GET
// =============================================================================

#[test]
fn test_bulk_get_preserves_order_and_gaps() {
    let store = quick_setup();
    store
        .bulk_set(&[
            SetRequest::new("x", json!("X")),
            SetRequest::new("z", json!("Z")),
        ])
        .unwrap();

    let records = store.bulk_get(&["z", "y", "x"]).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].as_ref().unwrap().value, json!("Z"));
    assert!(records[1].is_none());
    assert_eq!(records[2].as_ref().unwrap().value, json!("X"));
}

// =============================================================================
// EMPTY BATCHES
// =============================================================================

#[test]
fn test_empty_batches_succeed() {
    let store = quick_setup();
    assert!(store.bulk_set(&[]).unwrap().is_empty());
    store.bulk_delete(&[]).unwrap();
    assert!(store.transact(&[]).unwrap().is_empty());
    let none: Vec<String> = Vec::new();
    assert!(store.bulk_get(&none).unwrap().is_empty());
}
