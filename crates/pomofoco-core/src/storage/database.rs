//! SQLite-backed key-value storage.
//!
//! One table, `kv`, holds every persisted record as a string value.

use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

use super::{data_dir, KvStore};
use crate::error::StorageError;

/// Default database file name inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "pomofoco.db";

/// SQLite database used as the production [`KvStore`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database file `file_name` inside the data directory
    /// (normally [`DEFAULT_DATABASE_FILE`]).
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(file_name: &str) -> Result<Self, StorageError> {
        Self::open_at(data_dir()?.join(file_name))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        debug!(path = %path.as_ref().display(), "opening database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key, bytes = value.len(), "kv write");
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// All entries in one transaction.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            for (key, value) in entries {
                debug!(key, bytes = value.len(), "kv write (batch)");
                self.conn.execute(
                    "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                    params![key, value],
                )?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("test").unwrap().is_none());
        db.set("test", "hello").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn kv_set_overwrites() {
        let db = Database::open_memory().unwrap();
        db.set("pomodoroCounter", "1").unwrap();
        db.set("pomodoroCounter", "2").unwrap();
        assert_eq!(db.get("pomodoroCounter").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn set_many_writes_every_entry() {
        let db = Database::open_memory().unwrap();
        db.set("tasks", "[1]").unwrap();
        db.set_many(&[("tasks", "[]"), ("completedTasks", "[1]")])
            .unwrap();
        assert_eq!(db.get("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(db.get("completedTasks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn set_many_rolls_back_on_failure() {
        let db = Database::open_memory().unwrap();
        db.set("tasks", "[1]").unwrap();
        // fails the second write of the batch
        db.conn
            .execute_batch(
                "CREATE TRIGGER reject_completed BEFORE INSERT ON kv
                 WHEN NEW.key = 'completedTasks'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let err = db.set_many(&[("tasks", "[]"), ("completedTasks", "[1]")]);
        assert!(err.is_err());
        assert_eq!(db.get("tasks").unwrap().as_deref(), Some("[1]"));
        assert!(db.get("completedTasks").unwrap().is_none());
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.set("descansoPeriod", "3").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("descansoPeriod").unwrap().as_deref(), Some("3"));
    }
}
