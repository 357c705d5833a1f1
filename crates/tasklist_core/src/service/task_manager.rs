//! Task state manager.
//!
//! # Responsibility
//! - Own the authoritative in-memory task collection.
//! - Expose mutations, derived views and snapshot export/import.
//! - Synchronize the collection to storage after every mutation.
//!
//! # Invariants
//! - `Loading -> Ready` happens once, in `load`, and is irreversible.
//! - While `Loading`, views are empty and mutations are ignored.
//! - In-memory state is the source of truth; a failed save never rolls back.
//! - Storage and codec failures surface as `StorageIssue` values or booleans,
//!   never as errors or panics.

use crate::codec::snapshot::{
    decode, encode, encode_pretty, export_file_name, inspect, DecodeError, SnapshotInfo,
};
use crate::config::TasklistConfig;
use crate::db::DbResult;
use crate::model::task::{
    display_order, Priority, Task, TaskFilter, TaskId, TaskPatch, TaskStats,
};
use crate::storage::{KeyValueStore, SqliteKeyValueStore, StorageAdapter};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::path::Path;

/// Lifecycle phase of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

/// Result of the one-time load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot stored, or an empty one.
    Empty,
    /// Snapshot decoded with this many tasks.
    Restored(usize),
    /// Probe failed; the session runs in memory only.
    Unavailable,
    /// Stored snapshot had another format version and was purged.
    VersionMismatch,
    /// Stored snapshot could not be decoded; started empty.
    Corrupt,
    /// `load` was already called.
    AlreadyLoaded,
}

/// Storage status flag shown by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageIssue {
    /// Store failed the availability probe. Persists for the session.
    Unavailable,
    /// Stored snapshot was corrupt or version-mismatched.
    LoadFailed,
    /// Last save after a mutation failed.
    SaveFailed,
    /// Snapshot could not be encoded for export.
    ExportFailed,
    /// Import payload failed to decode.
    ImportRejected,
    /// Import file could not be read.
    ImportReadFailed,
    /// Stored snapshot key could not be erased.
    ClearFailed,
}

impl StorageIssue {
    pub fn message(self) -> &'static str {
        match self {
            Self::Unavailable => "storage is unavailable; changes will not be saved",
            Self::LoadFailed => "failed to load saved tasks",
            Self::SaveFailed => "failed to save tasks",
            Self::ExportFailed => "export failed",
            Self::ImportRejected => "invalid import file format",
            Self::ImportReadFailed => "failed to read import file",
            Self::ClearFailed => "failed to clear saved data",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Self::Unavailable => "storage_unavailable",
            Self::LoadFailed => "load_failed",
            Self::SaveFailed => "save_failed",
            Self::ExportFailed => "export_failed",
            Self::ImportRejected => "import_rejected",
            Self::ImportReadFailed => "import_read_failed",
            Self::ClearFailed => "clear_failed",
        }
    }
}

/// Pretty-printed snapshot ready to be written as a backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotExport {
    /// `todo-backup-YYYY-MM-DD.json` for the current UTC date.
    pub file_name: String,
    pub payload: String,
}

pub struct TaskManager<S: KeyValueStore> {
    storage: StorageAdapter<S>,
    tasks: Vec<Task>,
    filter: TaskFilter,
    phase: Phase,
    storage_available: bool,
    storage_error: Option<StorageIssue>,
}

impl TaskManager<SqliteKeyValueStore> {
    /// Opens the configured SQLite store. The manager starts in `Loading`.
    pub fn open(config: &TasklistConfig) -> DbResult<Self> {
        let store = SqliteKeyValueStore::open(&config.db_path)?;
        Ok(Self::new(StorageAdapter::with_key(
            store,
            config.storage_key.clone(),
        )))
    }
}

impl<S: KeyValueStore> TaskManager<S> {
    pub fn new(storage: StorageAdapter<S>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            phase: Phase::Loading,
            storage_available: true,
            storage_error: None,
        }
    }

    /// Wraps `store` with the default snapshot key.
    pub fn with_store(store: S) -> Self {
        Self::new(StorageAdapter::new(store))
    }

    /// Seeds the collection from storage and enters `Ready`.
    ///
    /// Never fails: every storage or decode problem ends in `Ready` with an
    /// empty collection and a `StorageIssue` recorded.
    pub fn load(&mut self) -> LoadOutcome {
        if self.phase == Phase::Ready {
            debug!("event=task_load module=service status=skipped reason=already_loaded");
            return LoadOutcome::AlreadyLoaded;
        }

        let outcome = self.load_snapshot();
        self.phase = Phase::Ready;
        info!(
            "event=task_load module=service status=ok outcome={:?} count={}",
            outcome,
            self.tasks.len()
        );
        outcome
    }

    fn load_snapshot(&mut self) -> LoadOutcome {
        if !self.storage.probe() {
            self.storage_available = false;
            self.report(StorageIssue::Unavailable);
            return LoadOutcome::Unavailable;
        }

        let Some(payload) = self.storage.read() else {
            return LoadOutcome::Empty;
        };

        match decode(&payload) {
            Ok(tasks) if tasks.is_empty() => LoadOutcome::Empty,
            Ok(tasks) => {
                let count = tasks.len();
                self.tasks = tasks;
                LoadOutcome::Restored(count)
            }
            Err(DecodeError::VersionMismatch { found, expected }) => {
                warn!(
                    "event=task_load module=service status=error error_code=version_mismatch found={} expected={}",
                    found.as_deref().unwrap_or("none"),
                    expected
                );
                if !self.storage.erase() {
                    warn!("event=task_load module=service status=error error_code=purge_failed");
                }
                self.report(StorageIssue::LoadFailed);
                LoadOutcome::VersionMismatch
            }
            Err(err) => {
                error!(
                    "event=task_load module=service status=error error_code=decode_failed error={err}"
                );
                self.report(StorageIssue::LoadFailed);
                LoadOutcome::Corrupt
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn storage_error(&self) -> Option<StorageIssue> {
        self.storage_error
    }

    pub fn storage(&self) -> &StorageAdapter<S> {
        &self.storage
    }

    pub fn current_filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Tasks matching the current filter in display order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.tasks_for(self.filter)
    }

    /// Tasks matching `filter` in display order.
    pub fn tasks_for(&self, filter: TaskFilter) -> Vec<&Task> {
        if self.is_loading() {
            return Vec::new();
        }
        let mut view: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect();
        view.sort_by(|a, b| display_order(a, b));
        view
    }

    /// Unfiltered collection in storage order.
    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Appends a new task. Returns `None` when `text` trims to empty.
    pub fn add(
        &mut self,
        text: &str,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
    ) -> Option<TaskId> {
        if !self.ensure_ready("add") {
            return None;
        }

        let mut task = match Task::new(text, due_date, priority) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=service status=skipped reason={err}");
                return None;
            }
        };
        while self.find(&task.id).is_some() {
            task.id = TaskId::generate();
        }

        let id = task.id.clone();
        self.tasks.push(task);
        info!("event=task_add module=service status=ok id={id} priority={priority}");
        self.persist();
        Some(id)
    }

    /// Flips `completed`. Returns whether the task exists.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        if !self.ensure_ready("toggle") {
            return false;
        }

        let found = match self.tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        };
        debug!("event=task_toggle module=service id={id} found={found}");
        self.persist();
        found
    }

    /// Removes a task. Returns whether it existed.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        if !self.ensure_ready("delete") {
            return false;
        }

        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let found = self.tasks.len() != before;
        debug!("event=task_delete module=service id={id} found={found}");
        self.persist();
        found
    }

    /// Merges `patch` into the matching task. Returns whether it exists.
    ///
    /// # Preconditions
    /// - `patch.text`, when present, is already trimmed and non-empty. Unlike
    ///   `add`, this method stores the text as given.
    pub fn update(&mut self, id: &TaskId, patch: &TaskPatch) -> bool {
        if !self.ensure_ready("update") {
            return false;
        }

        let found = match self.tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => {
                task.apply(patch);
                true
            }
            None => false,
        };
        debug!("event=task_update module=service id={id} found={found}");
        self.persist();
        found
    }

    /// Removes all completed tasks. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        if !self.ensure_ready("clear_completed") {
            return 0;
        }

        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        info!("event=task_clear_completed module=service status=ok removed={removed}");
        self.persist();
        removed
    }

    /// Replaces the collection verbatim.
    ///
    /// # Preconditions
    /// - Ids in `tasks` are unique. `decode` output always satisfies this.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        if !self.ensure_ready("replace_all") {
            return;
        }

        self.tasks = tasks;
        info!(
            "event=task_replace_all module=service status=ok count={}",
            self.tasks.len()
        );
        self.persist();
    }

    /// Empties the collection and erases the stored snapshot key.
    ///
    /// Returns `false` when the erase fails; memory is cleared regardless.
    pub fn clear_all(&mut self) -> bool {
        if !self.ensure_ready("clear_all") {
            return false;
        }

        self.tasks.clear();
        if self.storage.erase() {
            info!("event=task_clear_all module=service status=ok");
            self.clear_issue();
            true
        } else {
            self.report(StorageIssue::ClearFailed);
            false
        }
    }

    /// Pretty snapshot of the full collection for a backup file.
    pub fn export(&mut self) -> Option<SnapshotExport> {
        if !self.ensure_ready("export") {
            return None;
        }

        match encode_pretty(&self.tasks) {
            Ok(payload) => {
                let file_name = export_file_name(Utc::now().date_naive());
                info!(
                    "event=task_export module=service status=ok count={} bytes={}",
                    self.tasks.len(),
                    payload.len()
                );
                Some(SnapshotExport { file_name, payload })
            }
            Err(err) => {
                error!("event=task_export module=service status=error error={err}");
                self.report(StorageIssue::ExportFailed);
                None
            }
        }
    }

    /// Decodes `payload` and replaces the collection on success.
    ///
    /// All-or-nothing: on failure the collection is untouched.
    pub fn import(&mut self, payload: &str) -> bool {
        if !self.ensure_ready("import") {
            return false;
        }

        match decode(payload) {
            Ok(tasks) => {
                info!(
                    "event=task_import module=service status=ok count={}",
                    tasks.len()
                );
                self.tasks = tasks;
                self.clear_issue();
                self.persist();
                true
            }
            Err(err) => {
                warn!("event=task_import module=service status=error error={err}");
                self.report(StorageIssue::ImportRejected);
                false
            }
        }
    }

    /// Reads a backup file and imports it.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> bool {
        if !self.ensure_ready("import") {
            return false;
        }

        match std::fs::read_to_string(path.as_ref()) {
            Ok(payload) => self.import(&payload),
            Err(err) => {
                warn!(
                    "event=task_import module=service status=error error_code=read_failed path={} error={}",
                    path.as_ref().display(),
                    err
                );
                self.report(StorageIssue::ImportReadFailed);
                false
            }
        }
    }

    /// Snapshot presence, count and timestamp, read straight from storage.
    pub fn storage_info(&self) -> SnapshotInfo {
        let Some(payload) = self.storage.read() else {
            return SnapshotInfo::absent();
        };
        match inspect(&payload) {
            Ok(info) => info,
            Err(err) => {
                warn!("event=storage_info module=service status=error error={err}");
                SnapshotInfo::absent()
            }
        }
    }

    fn ensure_ready(&self, operation: &str) -> bool {
        if self.is_loading() {
            warn!(
                "event=task_{operation} module=service status=skipped reason=loading"
            );
            return false;
        }
        true
    }

    fn persist(&mut self) {
        if !self.storage_available {
            return;
        }

        let saved = match encode(&self.tasks) {
            Ok(payload) => self.storage.write(&payload),
            Err(err) => {
                error!("event=task_save module=service status=error error={err}");
                false
            }
        };

        if saved {
            self.clear_issue();
        } else {
            self.report(StorageIssue::SaveFailed);
        }
    }

    fn report(&mut self, issue: StorageIssue) {
        debug!(
            "event=storage_issue module=service status=error error_code={}",
            issue.code()
        );
        self.storage_error = Some(issue);
    }

    fn clear_issue(&mut self) {
        self.storage_error = if self.storage_available {
            None
        } else {
            Some(StorageIssue::Unavailable)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, Phase, TaskManager};
    use crate::model::task::{Priority, TaskFilter};
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn manager_starts_loading_with_empty_views() {
        let manager = TaskManager::with_store(MemoryKeyValueStore::new());
        assert_eq!(manager.phase(), Phase::Loading);
        assert!(manager.tasks().is_empty());
        assert_eq!(manager.stats().total, 0);
    }

    #[test]
    fn mutations_are_ignored_while_loading() {
        let mut manager = TaskManager::with_store(MemoryKeyValueStore::new());
        assert_eq!(manager.add("too early", None, Priority::High), None);
        assert!(!manager.clear_all());

        assert_eq!(manager.load(), LoadOutcome::Empty);
        assert!(manager.add("on time", None, Priority::High).is_some());
    }

    #[test]
    fn second_load_is_ignored() {
        let mut manager = TaskManager::with_store(MemoryKeyValueStore::new());
        manager.load();
        manager.add("kept", None, Priority::Low);

        assert_eq!(manager.load(), LoadOutcome::AlreadyLoaded);
        assert_eq!(manager.stats().total, 1);
    }

    #[test]
    fn filter_selection_drives_default_view() {
        let mut manager = TaskManager::with_store(MemoryKeyValueStore::new());
        manager.load();
        let done = manager.add("done", None, Priority::Low).unwrap();
        manager.add("open", None, Priority::Low);
        manager.toggle(&done);

        manager.set_filter(TaskFilter::Completed);
        let view = manager.tasks();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, done);
    }
}
