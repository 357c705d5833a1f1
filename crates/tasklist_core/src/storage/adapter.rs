//! Snapshot storage adapter.
//!
//! # Responsibility
//! - Bind a `KeyValueStore` to the single snapshot key.
//! - Convert every store error into a boolean/absent result at the origin.
//!
//! # Invariants
//! - `probe` leaves no residue on success and attempts cleanup on failure.
//! - No method returns an error or panics.

use super::kv::KeyValueStore;
use log::{error, warn};

/// Fixed application key holding the snapshot payload.
pub const DEFAULT_STORAGE_KEY: &str = "todo-app-data";
/// Throwaway key used by `probe`.
pub const PROBE_KEY: &str = "storage-test";

pub struct StorageAdapter<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> StorageAdapter<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks that the medium accepts a write followed by a delete.
    pub fn probe(&self) -> bool {
        if let Err(err) = self.store.set(PROBE_KEY, PROBE_KEY) {
            warn!("event=storage_probe module=storage status=error error={err}");
            let _ = self.store.remove(PROBE_KEY);
            return false;
        }

        match self.store.remove(PROBE_KEY) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=storage_probe module=storage status=error stage=remove error={err}");
                false
            }
        }
    }

    /// Returns the raw snapshot text, or `None` when absent or unreadable.
    pub fn read(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=storage_read module=storage status=error key={} error={}",
                    self.key, err
                );
                None
            }
        }
    }

    /// Stores the snapshot text. Returns `false` on any failure.
    pub fn write(&self, payload: &str) -> bool {
        match self.store.set(&self.key, payload) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=storage_write module=storage status=error key={} bytes={} error={}",
                    self.key,
                    payload.len(),
                    err
                );
                false
            }
        }
    }

    /// Removes the snapshot key. Returns `false` on failure.
    pub fn erase(&self) -> bool {
        match self.store.remove(&self.key) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=storage_erase module=storage status=error key={} error={}",
                    self.key, err
                );
                false
            }
        }
    }
}
