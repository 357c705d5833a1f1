//! Snapshot codec.
//!
//! # Responsibility
//! - Convert the task collection to and from the versioned snapshot payload.
//! - Keep the string/timestamp conversion boundary in one place.
//!
//! # Invariants
//! - Encoding always stamps the current `SNAPSHOT_VERSION` and `lastUpdated`.
//! - Decoding never panics; every failure is a `DecodeError` value.

pub mod snapshot;
