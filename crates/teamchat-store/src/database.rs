//! SQLite-backed [`KvStorage`].
//!
//! The [`SqliteStorage`] struct owns a [`rusqlite::Connection`] and guarantees
//! that migrations are run before any other operation.  All chat records
//! live in a single `kv` table keyed by `<namespace>_<record>`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migrations;
use crate::storage::KvStorage;

/// Wrapper around a [`rusqlite::Connection`].
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/teamchat/teamchat.db`
    /// - macOS:   `~/Library/Application Support/com.techcorp.teamchat/teamchat.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\techcorp\teamchat\data\teamchat.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "techcorp", "teamchat").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("teamchat.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Open a private in-memory database.  Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

impl KvStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    fn clear_prefix(&mut self, prefix: &str) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM kv WHERE substr(key, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut db = SqliteStorage::open_at(&path).expect("should open");
        assert!(db.path().is_some());
        db.set("chatApp_users", "[]").unwrap();
        drop(db);

        let db = SqliteStorage::open_at(&path).expect("should reopen");
        assert_eq!(db.get("chatApp_users").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn upsert_and_remove() {
        let mut db = SqliteStorage::open_in_memory().unwrap();
        db.set("k", "1").unwrap();
        db.set("k", "2").unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("2"));
        assert!(db.remove("k").unwrap());
        assert_eq!(db.get("k").unwrap(), None);
    }

    #[test]
    fn clear_prefix_is_literal() {
        let mut db = SqliteStorage::open_in_memory().unwrap();
        db.set("chat_App_users", "x").unwrap();
        db.set("chatApp_users", "x").unwrap();
        db.set("chatApp_groups", "x").unwrap();

        assert_eq!(db.clear_prefix("chatApp_").unwrap(), 2);
        assert!(db.get("chat_App_users").unwrap().is_some());
    }
}
