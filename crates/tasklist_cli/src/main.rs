//! `tasklist` command line front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging and drive one `TaskManager` command.
//! - Own file I/O for export; validate user input before it reaches the core.

mod cli;

use chrono::{DateTime, Utc};
use clap::Parser;
use cli::{Cli, Command};
use log::warn;
use std::process::ExitCode;
use tasklist_core::codec::snapshot::parse_timestamp;
use tasklist_core::logging::init_from_config;
use tasklist_core::{
    KeyValueStore, Priority, SnapshotInfo, Task, TaskFilter, TaskId, TaskManager, TaskPatch,
    TasklistConfig,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    if let Err(err) = config.validate() {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut manager = match TaskManager::open(&config) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("error: failed to open `{}`: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    manager.load();

    let result = run(&mut manager, cli.command);
    if let Some(issue) = manager.storage_error() {
        eprintln!("warning: {}", issue.message());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> TasklistConfig {
    let mut config = TasklistConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(key) = &cli.key {
        config.storage_key = key.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn run<S: KeyValueStore>(manager: &mut TaskManager<S>, command: Command) -> Result<(), String> {
    match command {
        Command::Add {
            text,
            due,
            priority,
        } => {
            let due = due.as_deref().map(parse_due).transpose()?;
            let priority = priority.parse::<Priority>().map_err(|err| err.to_string())?;
            let id = manager
                .add(&text, due, priority)
                .ok_or_else(|| "task text must not be empty".to_string())?;
            println!("added {id}");
        }
        Command::List { filter } => {
            let filter = filter.parse::<TaskFilter>().map_err(|err| err.to_string())?;
            manager.set_filter(filter);
            let tasks = manager.tasks();
            if tasks.is_empty() {
                println!("no tasks");
            }
            for task in tasks {
                println!("{}", format_task(task));
            }
        }
        Command::Toggle { id } => {
            let id = TaskId::from(id);
            if !manager.toggle(&id) {
                return Err(format!("task not found: {id}"));
            }
        }
        Command::Delete { id } => {
            let id = TaskId::from(id);
            if !manager.delete(&id) {
                return Err(format!("task not found: {id}"));
            }
        }
        Command::Edit {
            id,
            text,
            due,
            clear_due,
            priority,
        } => {
            let text = match text {
                Some(raw) if raw.trim().is_empty() => {
                    return Err("task text must not be empty".to_string());
                }
                Some(raw) => Some(raw.trim().to_string()),
                None => None,
            };
            let due_date = if clear_due {
                Some(None)
            } else {
                due.as_deref().map(parse_due).transpose()?.map(Some)
            };
            let priority = priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()
                .map_err(|err| err.to_string())?;
            let patch = TaskPatch {
                text,
                due_date,
                priority,
            };
            if patch.is_empty() {
                return Err("nothing to edit".to_string());
            }

            let id = TaskId::from(id);
            if !manager.update(&id, &patch) {
                return Err(format!("task not found: {id}"));
            }
        }
        Command::ClearCompleted => {
            let removed = manager.clear_completed();
            println!("removed {removed} completed task(s)");
        }
        Command::ClearAll => {
            if !manager.clear_all() {
                return Err("failed to erase stored snapshot".to_string());
            }
            println!("all tasks removed");
        }
        Command::Export { dir } => {
            let export = manager
                .export()
                .ok_or_else(|| "export failed".to_string())?;
            let path = dir.join(&export.file_name);
            std::fs::write(&path, export.payload).map_err(|err| {
                warn!("event=task_export module=cli status=error error={err}");
                format!("failed to write `{}`: {err}", path.display())
            })?;
            println!("exported to {}", path.display());
        }
        Command::Import { file } => {
            if !manager.import_file(&file) {
                return Err(format!("import of `{}` failed", file.display()));
            }
            println!("imported {} task(s)", manager.stats().total);
        }
        Command::Info => print_info(&manager.storage_info()),
        Command::Stats => {
            let stats = manager.stats();
            println!(
                "total={} active={} completed={}",
                stats.total, stats.active, stats.completed
            );
        }
    }

    Ok(())
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .map_err(|_| format!("invalid due date `{raw}`; expected RFC 3339 or YYYY-MM-DD"))
}

fn format_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let due = task
        .due_date
        .map(|due| due.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "[{mark}] {:<6} {:<10} {}  ({})",
        task.priority.as_str(),
        due,
        task.text,
        task.id
    )
}

fn print_info(info: &SnapshotInfo) {
    if !info.has_data {
        println!("stored snapshot: none");
        return;
    }
    println!("stored snapshot: present");
    if let Some(count) = info.todo_count {
        println!("  tasks: {count}");
    }
    if let Some(last_updated) = info.last_updated {
        println!("  last updated: {}", last_updated.to_rfc3339());
    }
}
