//! Persistence boundary — a key-value store with one fixed key.
//!
//! RULE: Only save.rs talks to the database. The store serializes the
//! whole document to JSON and hands it here; read/write/delete are the
//! only three operations the core asks of this boundary.

use crate::error::CoreResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

/// The single fixed slot key.
pub const SAVE_KEY: &str = "tradewinds_save";

/// Result of a persistence attempt. A skipped write is not an error:
/// callers that need durability before a non-recoverable action check
/// for `DebouncedSkip` and force a second attempt after the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    DebouncedSkip,
}

/// What the core requires from any persistence backend.
pub trait SaveBackend {
    fn read(&self, key: &str) -> CoreResult<Option<String>>;
    fn write(&mut self, key: &str, payload: &str) -> CoreResult<()>;
    fn delete(&mut self, key: &str) -> CoreResult<()>;
}

/// SQLite-backed slot storage.
pub struct SqliteSaveStore {
    conn: Connection,
}

impl SqliteSaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests and dry runs).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> CoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS save_slot (
                slot_key   TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                written_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl SaveBackend for SqliteSaveStore {
    fn read(&self, key: &str) -> CoreResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM save_slot WHERE slot_key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write(&mut self, key: &str, payload: &str) -> CoreResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (slot_key, payload, written_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(slot_key) DO UPDATE SET
                payload = excluded.payload,
                written_at = excluded.written_at",
            params![key, payload, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> CoreResult<()> {
        self.conn
            .execute("DELETE FROM save_slot WHERE slot_key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MemorySaveStore {
    slots: HashMap<String, String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot directly; used by migration tests.
    pub fn with_payload(key: &str, payload: &str) -> Self {
        let mut store = Self::default();
        store.slots.insert(key.to_string(), payload.to_string());
        store
    }
}

impl SaveBackend for MemorySaveStore {
    fn read(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> CoreResult<()> {
        self.slots.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> CoreResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
