use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tasklist_core::codec::snapshot::encode_at;
use tasklist_core::{
    decode, encode, encode_pretty, inspect, DecodeError, Priority, Task, TaskId, SNAPSHOT_VERSION,
};

fn sample_tasks() -> Vec<Task> {
    let created = Utc.with_ymd_and_hms(2025, 2, 10, 8, 15, 30).unwrap()
        + Duration::milliseconds(250);
    vec![
        Task {
            id: TaskId::from("11111111-2222-4333-8444-555555555555"),
            text: "file taxes".to_string(),
            completed: false,
            created_at: created,
            due_date: Some(created + Duration::days(3)),
            priority: Priority::High,
        },
        Task {
            id: TaskId::from("legacy-42"),
            text: "water plants".to_string(),
            completed: true,
            created_at: created - Duration::hours(2),
            due_date: None,
            priority: Priority::Low,
        },
    ]
}

#[test]
fn encode_then_decode_preserves_task_fields() {
    let tasks = sample_tasks();
    let payload = encode(&tasks).unwrap();

    assert_eq!(decode(&payload).unwrap(), tasks);
}

#[test]
fn encode_uses_expected_wire_fields() {
    let last_updated = Utc.with_ymd_and_hms(2025, 2, 11, 0, 0, 0).unwrap();
    let payload = encode_at(&sample_tasks(), last_updated).unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(value["version"], SNAPSHOT_VERSION);
    assert_eq!(value["lastUpdated"], "2025-02-11T00:00:00.000Z");
    let first = &value["todos"][0];
    assert_eq!(first["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(first["createdAt"], "2025-02-10T08:15:30.250Z");
    assert_eq!(first["dueDate"], "2025-02-13T08:15:30.250Z");
    assert_eq!(first["priority"], "high");
    assert_eq!(first["completed"], false);
    assert!(value["todos"][1].get("dueDate").is_none());
}

#[test]
fn pretty_encoding_is_indented_and_decodable() {
    let payload = encode_pretty(&sample_tasks()).unwrap();
    assert!(payload.contains("\n  \"version\": \"1.0\""));
    assert_eq!(decode(&payload).unwrap().len(), 2);
}

#[test]
fn decode_rejects_non_array_todos_as_invalid_format() {
    let payload = json!({ "todos": "not-an-array" }).to_string();
    assert_eq!(decode(&payload).unwrap_err(), DecodeError::InvalidFormat);

    let missing = json!({ "version": SNAPSHOT_VERSION }).to_string();
    assert_eq!(decode(&missing).unwrap_err(), DecodeError::InvalidFormat);
}

#[test]
fn decode_reports_version_mismatch() {
    let payload = json!({ "version": "0.9", "todos": [], "lastUpdated": "2025-01-01T00:00:00.000Z" })
        .to_string();
    assert_eq!(
        decode(&payload).unwrap_err(),
        DecodeError::VersionMismatch {
            found: Some("0.9".to_string()),
            expected: SNAPSHOT_VERSION,
        }
    );

    let missing = json!({ "todos": [] }).to_string();
    assert!(matches!(
        decode(&missing).unwrap_err(),
        DecodeError::VersionMismatch { found: None, .. }
    ));
}

#[test]
fn decode_reports_unparseable_text_as_corrupt() {
    assert!(matches!(decode("{not json").unwrap_err(), DecodeError::Corrupt(_)));
}

#[test]
fn decode_reports_bad_timestamp_as_corrupt() {
    let payload = json!({
        "version": SNAPSHOT_VERSION,
        "todos": [{
            "id": "a",
            "text": "x",
            "completed": false,
            "createdAt": "yesterday",
            "priority": "low"
        }]
    })
    .to_string();

    match decode(&payload).unwrap_err() {
        DecodeError::Corrupt(details) => assert!(details.contains("createdAt"), "{details}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decode_accepts_null_due_date_and_missing_priority() {
    let payload = json!({
        "version": SNAPSHOT_VERSION,
        "todos": [{
            "id": "a",
            "text": "x",
            "completed": true,
            "createdAt": "2025-01-01T00:00:00.000Z",
            "dueDate": null
        }]
    })
    .to_string();

    let tasks = decode(&payload).unwrap();
    assert_eq!(tasks[0].due_date, None);
    assert_eq!(tasks[0].priority, Priority::Medium);
}

#[test]
fn decode_skips_blank_text_and_repeated_ids_but_keeps_valid_entries() {
    let payload = json!({
        "version": SNAPSHOT_VERSION,
        "todos": [
            { "id": "a", "text": "important 1", "createdAt": "2025-01-01T00:00:00Z" },
            { "id": "b", "text": "important 2", "createdAt": "2025-01-02T00:00:00Z" },
            { "id": "c", "text": " ", "createdAt": "2025-01-03T00:00:00Z" },
            { "id": "a", "text": "shadowed", "createdAt": "2025-01-04T00:00:00Z" }
        ]
    })
    .to_string();

    let tasks = decode(&payload).unwrap();
    let texts: Vec<&str> = tasks.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["important 1", "important 2"]);
    assert_eq!(tasks[0].id, TaskId::from("a"));
}

#[test]
fn decode_reads_offsetless_iso_timestamps_as_utc() {
    let payload = json!({
        "version": SNAPSHOT_VERSION,
        "todos": [{
            "id": "a",
            "text": "foreign backup",
            "createdAt": "2024-01-01T00:00:00",
            "dueDate": "2024-05-01"
        }]
    })
    .to_string();

    let tasks = decode(&payload).unwrap();
    assert_eq!(
        tasks[0].created_at,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        tasks[0].due_date,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn inspect_reads_count_and_last_updated_only() {
    let last_updated = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let payload = encode_at(&sample_tasks(), last_updated).unwrap();

    let info = inspect(&payload).unwrap();
    assert!(info.has_data);
    assert_eq!(info.todo_count, Some(2));
    assert_eq!(info.last_updated, Some(last_updated));
}

#[test]
fn inspect_does_not_validate_task_entries() {
    let payload = json!({
        "version": "0.1",
        "todos": [{ "anything": true }, 3],
        "lastUpdated": "2025-03-01T09:00:00.000Z"
    })
    .to_string();

    assert_eq!(inspect(&payload).unwrap().todo_count, Some(2));
}
