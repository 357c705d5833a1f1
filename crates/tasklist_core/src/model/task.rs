//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its priority/filter vocabulary.
//! - Own the display ordering used by every derived view.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `text` is trimmed and non-empty when produced by `Task::new`.
//! - Collection order carries no meaning; views sort with `display_order`.
//! - Timestamps are held at millisecond precision, the snapshot resolution.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque task identifier.
///
/// Freshly created tasks get a UUID v4 rendering, but any non-empty string
/// read from a snapshot is accepted so foreign backups stay importable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task urgency. Serialized lowercase to match the snapshot wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort weight; higher ranks are shown first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TaskValidationError::UnknownPriority(other.to_string())),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for task input and persisted task state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming.
    EmptyText,
    /// Identifier is an empty string.
    EmptyId,
    /// Priority string is not one of `low|medium|high`.
    UnknownPriority(String),
    /// Filter string is not one of `all|active|completed`.
    UnknownFilter(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::UnknownPriority(value) => {
                write!(f, "unknown priority `{value}`; expected low|medium|high")
            }
            Self::UnknownFilter(value) => {
                write!(f, "unknown filter `{value}`; expected all|active|completed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
}

impl Task {
    /// Creates a task with a generated id and `created_at = now`.
    ///
    /// # Errors
    /// - `EmptyText` when `text` trims to nothing.
    pub fn new(
        text: &str,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
    ) -> Result<Self, TaskValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskValidationError::EmptyText);
        }

        Ok(Self {
            id: TaskId::generate(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now().trunc_subsecs(3),
            due_date: due_date.map(|due| due.trunc_subsecs(3)),
            priority,
        })
    }

    /// Checks stored-state invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Merges the provided fields. Text is applied as given.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date.map(|due| due.trunc_subsecs(3));
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// Partial update for `text`, `due_date` and `priority`.
///
/// `due_date: Some(None)` clears the due date; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.due_date.is_none() && self.priority.is_none()
    }
}

/// Completion filter for derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskFilter {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(TaskValidationError::UnknownFilter(other.to_string())),
        }
    }
}

/// Aggregate counts over the unfiltered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}

/// Display ordering shared by every derived view.
///
/// Keys, in order: incomplete before complete, higher priority first,
/// earlier due date first (present beats absent), newer `created_at` first.
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}
