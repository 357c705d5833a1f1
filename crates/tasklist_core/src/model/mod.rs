//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record owned by the task manager.
//! - Provide the derived-view vocabulary (filters, stats, display order).
//!
//! # Invariants
//! - Every task is identified by a `TaskId` that is unique in its collection.
//! - Stored task text is never empty or whitespace-only.
//! - Timestamps are native `chrono` values; string forms exist only on the wire.

pub mod task;
