//! Runtime configuration for the task store.
//!
//! # Responsibility
//! - Resolve database path, snapshot key and logging settings.
//! - Apply `TASKLIST_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Blank environment values are ignored, never applied.
//! - A validated config has a non-empty storage key and absolute log dir.

use crate::logging::default_log_level;
use crate::storage::DEFAULT_STORAGE_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKLIST_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "TASKLIST_STORAGE_KEY";
pub const ENV_LOG_DIR: &str = "TASKLIST_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "tasklist-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage key cannot be empty"),
            Self::RelativeLogDir(path) => write!(
                f,
                "log dir must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasklistConfig {
    /// SQLite file holding the key-value store.
    pub db_path: PathBuf,
    /// Key of the snapshot slot.
    pub storage_key: String,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for TasklistConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        }
    }
}

impl TasklistConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(value) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(ENV_STORAGE_KEY) {
            config.storage_key = value;
        }
        if let Some(value) = non_blank(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(value);
        }
        if let Some(value) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !self.log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(self.log_dir.clone()));
        }
        Ok(())
    }
}
