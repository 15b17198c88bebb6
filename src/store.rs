//! Key-value persistence backend.
//!
//! Gameplay treats persistence as two independent string blobs (profile and
//! analytics) behind [`KvStore`]. Writes are best-effort: failures are logged
//! and swallowed, never surfaced to the player.

use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract string key-value store.
///
/// `get` returns `None` on absence or on a read failure; `set` swallows
/// failures. The game never blocks on persistence succeeding.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Shared handle to a store, as held by the progress and analytics layers.
pub type SharedStore = Rc<dyn KvStore>;

/// SQLite-backed store: a single two-column table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read from store");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let result = self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        );
        if let Err(e) = result {
            warn!(key, error = %e, "failed to write to store");
        }
    }
}

/// In-memory store, used in tests and as a fallback when the data directory
/// is unavailable (progress then lasts for the session only).
#[derive(Default)]
pub struct MemoryStore {
    map: RefCell<HashMap<String, String>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        *self.writes.borrow_mut() += 1;
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }
}
