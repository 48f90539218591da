//! Failure semantics: partial loads, malformed snapshots, bad paths.

mod common;

use common::MockApi;
use rollcall::{
    Collection, Loader, MemorySnapshots, StatePatch, StatePath, StateTree, Store, StoreError,
};

/// Recovery paths emit warnings; capture them per test.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_failed_collection_fails_load_but_keeps_partial_state() {
    let mut api = MockApi::with_sample_data();
    // Attendance is fetched last; everything before it commits.
    api.fail.push(Collection::Attendance);

    let mut store = Store::in_memory();
    let result = Loader::new(&api).load_all(&mut store);

    match result {
        Err(StoreError::Fetch { collection, .. }) => {
            assert_eq!(collection, Collection::Attendance)
        }
        other => panic!("expected fetch error, got {:?}", other),
    }

    // Successful fetches stayed committed; nothing was rolled back.
    let state = store.state();
    assert_eq!(state.locations.len(), 3);
    assert_eq!(state.persons.len(), 2);
    assert!(state.attendance.is_empty());

    // Derived stats were not recomputed for a failed load.
    assert_eq!(state.stats.total_locations, 0);
}

#[test]
fn test_all_collections_attempted_despite_early_failure() {
    let mut api = MockApi::with_sample_data();
    // PersonTypes is fetched first; later collections still commit.
    api.fail.push(Collection::PersonTypes);

    let mut store = Store::in_memory();
    let result = Loader::new(&api).load_all(&mut store);
    assert!(result.is_err());

    let state = store.state();
    assert!(state.person_types.is_empty());
    assert_eq!(state.locations.len(), 3);
    assert_eq!(state.attendance.len(), 2);
}

#[test]
fn test_undecodable_record_is_a_fetch_failure() {
    let mut api = MockApi::with_sample_data();
    // Valid JSON, wrong shape: check_in is mandatory for events.
    api.attendance = vec![serde_json::json!({"id": 9, "person_name": "X",
                                             "location_name": "Y"})];

    let mut store = Store::in_memory();
    let result = Loader::new(&api).load_all(&mut store);

    assert!(matches!(
        result,
        Err(StoreError::Fetch {
            collection: Collection::Attendance,
            ..
        })
    ));
    assert!(store.state().attendance.is_empty());
}

#[test]
fn test_malformed_snapshot_falls_back_to_defaults() {
    init_tracing();
    for bad in ["{truncated", "[1,2,3]", "\"just a string\"", ""] {
        let store = Store::open(Box::new(MemorySnapshots::with_snapshot(bad)));
        assert_eq!(store.state(), StateTree::default(), "snapshot: {:?}", bad);
    }
}

#[test]
fn test_snapshot_with_wrong_shape_falls_back_to_defaults() {
    init_tracing();
    // Parses as JSON but violates the schema: theme must be a string.
    let store = Store::open(Box::new(MemorySnapshots::with_snapshot(
        r#"{"ui":{"theme":42}}"#,
    )));
    assert_eq!(store.state(), StateTree::default());
}

#[test]
fn test_invalid_subscription_path_rejected() {
    assert!(matches!(
        StatePath::parse("nonexistent.section"),
        Err(StoreError::InvalidPath(_))
    ));
}

#[test]
fn test_raw_patch_with_unknown_section_rejected() {
    let result = StatePatch::from_value(serde_json::json!({"bogus": 1}));
    assert!(matches!(result, Err(StoreError::Deserialization(_))));
}

#[test]
fn test_bad_raw_patch_leaves_tree_untouched() {
    let mut store = Store::in_memory();
    let before = store.state();

    // Shape violation only detectable after merge: session must be an object.
    let patch = StatePatch::from_value(serde_json::json!({"session": 5})).unwrap();
    let result = store.set_state(patch);

    assert!(result.is_err());
    assert_eq!(store.state(), before);
}
