use tasklist_core::storage::PROBE_KEY;
use tasklist_core::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageAdapter, DEFAULT_STORAGE_KEY,
};

#[test]
fn probe_succeeds_without_leaving_residue() {
    let store = MemoryKeyValueStore::new();
    let adapter = StorageAdapter::new(store.clone());

    assert!(adapter.probe());
    assert!(store.is_empty());
}

#[test]
fn probe_fails_when_writes_fail_and_leaves_no_residue() {
    let store = MemoryKeyValueStore::new();
    store.set_fail_writes(true);
    let adapter = StorageAdapter::new(store.clone());

    assert!(!adapter.probe());
    assert!(!store.contains_key(PROBE_KEY));
}

#[test]
fn probe_fails_when_store_is_full() {
    let adapter = StorageAdapter::new(MemoryKeyValueStore::with_capacity(4));
    assert!(!adapter.probe());
}

#[test]
fn read_write_erase_use_the_snapshot_key() {
    let store = MemoryKeyValueStore::new();
    let adapter = StorageAdapter::new(store.clone());

    assert_eq!(adapter.read(), None);
    assert!(adapter.write("{\"todos\":[]}"));
    assert_eq!(
        store.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("{\"todos\":[]}")
    );
    assert_eq!(adapter.read().as_deref(), Some("{\"todos\":[]}"));

    assert!(adapter.erase());
    assert_eq!(adapter.read(), None);
}

#[test]
fn write_and_erase_report_failures_as_false() {
    let store = MemoryKeyValueStore::new();
    let adapter = StorageAdapter::new(store.clone());
    store.set_fail_writes(true);
    store.set_fail_removes(true);

    assert!(!adapter.write("payload"));
    assert!(!adapter.erase());
}

#[test]
fn read_failure_is_reported_as_absent() {
    let store = MemoryKeyValueStore::new();
    let adapter = StorageAdapter::new(store.clone());
    assert!(adapter.write("payload"));

    store.set_fail_reads(true);
    assert_eq!(adapter.read(), None);
}

#[test]
fn custom_key_isolates_snapshots_in_sqlite() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    let adapter = StorageAdapter::with_key(store, "profile-b");

    assert!(adapter.probe());
    assert!(adapter.write("b"));
    assert_eq!(adapter.key(), "profile-b");
    assert_eq!(adapter.store().get(DEFAULT_STORAGE_KEY).unwrap(), None);
    assert_eq!(adapter.read().as_deref(), Some("b"));
}
