//! In-process key-value store with failure injection.
//!
//! Clones share one underlying map, so a test can keep a handle while the
//! task manager owns another.

use super::kv::{KeyValueStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
    fail_removes: bool,
}

impl MemoryState {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits total stored bytes (keys plus values).
    pub fn with_capacity(capacity: usize) -> Self {
        let store = Self::new();
        store.state.borrow_mut().capacity = Some(capacity);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn set_fail_removes(&self, fail: bool) {
        self.state.borrow_mut().fail_removes = fail;
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        if let Some(limit) = state.capacity {
            let requested = state.used_bytes_without(key) + key.len() + value.len();
            if requested > limit {
                return Err(StoreError::QuotaExceeded { limit, requested });
            }
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_removes {
            return Err(StoreError::Unavailable("removes disabled".to_string()));
        }
        state.entries.remove(key);
        Ok(())
    }
}
