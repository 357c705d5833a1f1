//! Command line arguments for the `tasklist` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(version, about = "Single-user task list with local snapshot storage", long_about = None)]
pub struct Cli {
    /// SQLite database file (overrides TASKLIST_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Snapshot key inside the store (overrides TASKLIST_STORAGE_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Absolute log directory (overrides TASKLIST_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides TASKLIST_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task
    Add {
        text: String,

        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,

        /// low|medium|high
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },

    /// List tasks in display order
    List {
        /// all|active|completed
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Flip a task between active and completed
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Edit text, due date or priority
    Edit {
        id: String,

        #[arg(short, long)]
        text: Option<String>,

        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// low|medium|high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Remove all completed tasks
    ClearCompleted,

    /// Remove every task and the stored snapshot
    ClearAll,

    /// Write a todo-backup-<date>.json snapshot
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Replace all tasks with a backup file
    Import { file: PathBuf },

    /// Show stored snapshot status
    Info,

    /// Show task counts
    Stats,
}
