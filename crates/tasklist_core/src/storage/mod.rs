//! Key-value storage media and the snapshot storage adapter.
//!
//! # Responsibility
//! - Define the `KeyValueStore` seam the task manager is generic over.
//! - Provide SQLite-backed and in-memory store implementations.
//! - Bind a store to the single snapshot key via `StorageAdapter`.
//!
//! # Invariants
//! - Store errors never cross `StorageAdapter`; callers see booleans/options.
//! - The task manager never references a concrete medium.

pub mod adapter;
pub mod kv;
pub mod memory_kv;
pub mod sqlite_kv;

pub use adapter::{StorageAdapter, DEFAULT_STORAGE_KEY, PROBE_KEY};
pub use kv::{KeyValueStore, StoreError, StoreResult};
pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;
