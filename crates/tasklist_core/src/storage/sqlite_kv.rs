//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Connections handed to `new` must have migrations applied; use
//!   `open`/`open_in_memory` to get one that does.
//! - `set` is an upsert; at most one row exists per key.

use super::kv::{KeyValueStore, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a database file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}
