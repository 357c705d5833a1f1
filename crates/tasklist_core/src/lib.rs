//! Core task list logic: task model, snapshot codec, storage adapter and the
//! task state manager.
//! This crate is the single source of truth for business invariants.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use codec::snapshot::{
    decode, encode, encode_pretty, export_file_name, inspect, CodecError, DecodeError,
    SnapshotInfo, SNAPSHOT_VERSION,
};
pub use config::{ConfigError, TasklistConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    display_order, Priority, Task, TaskFilter, TaskId, TaskPatch, TaskStats, TaskValidationError,
};
pub use service::task_manager::{LoadOutcome, Phase, SnapshotExport, StorageIssue, TaskManager};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageAdapter, StoreError,
    StoreResult, DEFAULT_STORAGE_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
