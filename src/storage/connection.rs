//! Key-value store connection management
//!
//! The registry is persisted as one blob under a fixed key. The blob lives in
//! a single-table SQLite database so every write is an atomic, durable commit.

use std::path::Path;
use rusqlite::{params, Connection, OptionalExtension};
use crate::error::{DocError, Result};

/// Namespace key the document registry is stored under.
pub const DOCUMENTS_KEY: &str = "documents";
/// Last blob that could not be loaded intact, kept before it is overwritten.
pub const DOCUMENTS_BACKUP_KEY: &str = "documents.backup";

pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open (or create) the store at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self> {
        let db_dir = db_path.parent()
            .ok_or_else(|| DocError::InvalidPath(format!("Invalid database path: {}", db_path.display())))?;

        if !db_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(db_dir).map_err(DocError::Io)?;
        }

        let conn = Connection::open(db_path).map_err(DocError::Database)?;

        // WAL keeps readers cheap; FULL sync makes each commit crash-safe.
        conn.pragma_update(None, "journal_mode", WAL)?;
        conn.pragma_update(None, "synchronous", FULL)?;

        Self::initialize(&conn)?;
        tracing::info!("Key-value store opened at: {}", db_path.display());

        Ok(Self { conn })
    }

    /// Volatile store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DocError::Database)?;
        Self::initialize(&conn)?;
        Ok(Self { conn })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
        "#)?;
        tracing::debug!("Ensured kv_store table");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        tracing::debug!("Wrote key '{}' ({} bytes)", key, value.len());
        Ok(())
    }

}

// SQL pragma constants
const WAL: &str = "WAL";
const FULL: &str = "FULL";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_overwrite() {
        let store = KvStore::open_in_memory().unwrap();
        assert_eq!(store.get("documents").unwrap(), None);

        store.put("documents", "[]").unwrap();
        assert_eq!(store.get("documents").unwrap().as_deref(), Some("[]"));

        store.put("documents", "[1]").unwrap();
        assert_eq!(store.get("documents").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("documents.db");

        {
            let store = KvStore::open(&db_path).unwrap();
            store.put(DOCUMENTS_KEY, "payload").unwrap();
        }

        let store = KvStore::open(&db_path).unwrap();
        assert_eq!(store.get(DOCUMENTS_KEY).unwrap().as_deref(), Some("payload"));
    }
}
