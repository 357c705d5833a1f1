//! Versioned snapshot payload (JSON text).
//!
//! # Responsibility
//! - Encode tasks into the `{version, todos, lastUpdated}` wire shape.
//! - Decode and validate payloads coming from storage or import files.
//! - Read snapshot metadata without materializing tasks.
//!
//! # Invariants
//! - Wire timestamps are ISO-8601 UTC strings with millisecond precision.
//! - A decoded collection satisfies `Task::validate` and has unique ids;
//!   entries breaking either are skipped, the rest of the snapshot survives.
//! - Offsetless ISO-8601 timestamps (`2024-05-01`, `2024-05-01T09:30:00`)
//!   are read as UTC.

use crate::model::task::{Priority, Task, TaskId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use log::warn;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

const EXPORT_FILE_PREFIX: &str = "todo-backup-";

pub type CodecResult<T> = Result<T, CodecError>;

/// Fatal encode failure from the JSON serializer.
#[derive(Debug)]
pub struct CodecError(serde_json::Error);

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "snapshot encode failed: {}", self.0)
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Reasons a payload cannot be turned back into tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// `todos` is missing or is not an array.
    InvalidFormat,
    /// `version` is missing or differs from `SNAPSHOT_VERSION`.
    VersionMismatch {
        found: Option<String>,
        expected: &'static str,
    },
    /// Payload is not parseable JSON or a task entry is malformed.
    Corrupt(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid snapshot format: `todos` must be an array"),
            Self::VersionMismatch { found, expected } => match found {
                Some(found) => write!(
                    f,
                    "snapshot version `{found}` does not match expected `{expected}`"
                ),
                None => write!(f, "snapshot version missing; expected `{expected}`"),
            },
            Self::Corrupt(details) => write!(f, "corrupt snapshot: {details}"),
        }
    }
}

impl Error for DecodeError {}

/// Snapshot metadata for status display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotInfo {
    pub has_data: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub todo_count: Option<usize>,
}

impl SnapshotInfo {
    /// Info for a missing or unreadable snapshot.
    pub fn absent() -> Self {
        Self::default()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    version: &'a str,
    todos: Vec<TaskRecord>,
    last_updated: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotHeader {
    todos: Vec<IgnoredAny>,
    last_updated: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
    created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    #[serde(default)]
    priority: Priority,
}

impl TaskRecord {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            created_at: format_timestamp(task.created_at),
            due_date: task.due_date.map(format_timestamp),
            priority: task.priority,
        }
    }

    fn into_task(self, index: usize) -> Result<Task, DecodeError> {
        let created_at = parse_timestamp(&self.created_at).map_err(|err| {
            DecodeError::Corrupt(format!("todos[{index}].createdAt: {err}"))
        })?;
        let due_date = match self.due_date.as_deref() {
            Some(raw) => Some(parse_timestamp(raw).map_err(|err| {
                DecodeError::Corrupt(format!("todos[{index}].dueDate: {err}"))
            })?),
            None => None,
        };

        Ok(Task {
            id: self.id,
            text: self.text,
            completed: self.completed,
            created_at,
            due_date,
            priority: self.priority,
        })
    }
}

/// Encodes tasks as a compact snapshot stamped with the current time.
pub fn encode(tasks: &[Task]) -> CodecResult<String> {
    encode_at(tasks, Utc::now())
}

/// Encodes tasks as a two-space indented snapshot for export files.
pub fn encode_pretty(tasks: &[Task]) -> CodecResult<String> {
    serde_json::to_string_pretty(&snapshot_out(tasks, Utc::now())).map_err(CodecError)
}

/// Encodes tasks with an explicit `lastUpdated` value.
pub fn encode_at(tasks: &[Task], last_updated: DateTime<Utc>) -> CodecResult<String> {
    serde_json::to_string(&snapshot_out(tasks, last_updated)).map_err(CodecError)
}

/// Decodes a snapshot payload into tasks.
///
/// Checks run in order: JSON shape, `todos` array, version, entries. The
/// first failure wins. Entries that parse but break a task invariant, or
/// repeat an earlier id, are dropped with a warning (first id wins).
pub fn decode(payload: &str) -> Result<Vec<Task>, DecodeError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| DecodeError::Corrupt(err.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(DecodeError::Corrupt(
            "snapshot root is not an object".to_string(),
        ));
    };

    let entries = match root.remove("todos") {
        Some(Value::Array(entries)) => entries,
        _ => return Err(DecodeError::InvalidFormat),
    };

    match root.get("version") {
        Some(Value::String(version)) if version == SNAPSHOT_VERSION => {}
        Some(Value::String(version)) => {
            return Err(version_mismatch(Some(version.clone())));
        }
        Some(other) => return Err(version_mismatch(Some(other.to_string()))),
        None => return Err(version_mismatch(None)),
    }

    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let record: TaskRecord = serde_json::from_value(entry)
            .map_err(|err| DecodeError::Corrupt(format!("todos[{index}]: {err}")))?;
        tasks.push(record.into_task(index)?);
    }

    let mut seen = HashSet::with_capacity(tasks.len());
    let mut kept = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.into_iter().enumerate() {
        if let Err(reason) = task.validate() {
            warn!(
                "event=snapshot_decode module=codec status=skipped index={index} reason={reason}"
            );
            continue;
        }
        if !seen.insert(task.id.clone()) {
            warn!(
                "event=snapshot_decode module=codec status=skipped index={index} reason=duplicate_id id={}",
                task.id
            );
            continue;
        }
        kept.push(task);
    }

    Ok(kept)
}

/// Reads `lastUpdated` and the entry count without building tasks.
pub fn inspect(payload: &str) -> Result<SnapshotInfo, DecodeError> {
    let header: SnapshotHeader =
        serde_json::from_str(payload).map_err(|err| DecodeError::Corrupt(err.to_string()))?;
    let last_updated = parse_timestamp(&header.last_updated)
        .map_err(|err| DecodeError::Corrupt(format!("lastUpdated: {err}")))?;

    Ok(SnapshotInfo {
        has_data: true,
        last_updated: Some(last_updated),
        todo_count: Some(header.todos.len()),
    })
}

/// Export file name for a given calendar date: `todo-backup-YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Renders a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 timestamp into UTC.
///
/// RFC 3339 with any offset is preferred; a date-time without offset or a
/// bare date is taken as UTC (midnight for a bare date).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    let rfc3339_err = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(err) => err,
    };
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or(rfc3339_err)
}

fn snapshot_out(tasks: &[Task], last_updated: DateTime<Utc>) -> SnapshotOut<'static> {
    SnapshotOut {
        version: SNAPSHOT_VERSION,
        todos: tasks.iter().map(TaskRecord::from_task).collect(),
        last_updated: format_timestamp(last_updated),
    }
}

fn version_mismatch(found: Option<String>) -> DecodeError {
    DecodeError::VersionMismatch {
        found,
        expected: SNAPSHOT_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, export_file_name, format_timestamp, parse_timestamp, DecodeError};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn timestamps_render_with_millis_and_z_suffix() {
        let value = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(value), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn parse_timestamp_normalizes_offsets_to_utc() {
        let parsed = parse_timestamp("2024-05-01T18:30:00+09:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_reads_offsetless_forms_as_utc() {
        assert_eq!(
            parse_timestamp("2024-01-01T06:45:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 45, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-05-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(export_file_name(date), "todo-backup-2025-01-07.json");
    }

    #[test]
    fn non_object_root_is_corrupt() {
        assert!(matches!(decode("[1, 2]"), Err(DecodeError::Corrupt(_))));
    }
}
