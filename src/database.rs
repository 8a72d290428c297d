use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PrefsError;
use crate::schema::{CREATE_SCHEMA_SQL, SCHEMA_VERSION};

/// How long a writer waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite file holding preferences and credentials for one or more scopes.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn connect(db_path: &Path) -> Result<Self, PrefsError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path).map_err(PrefsError::DatabaseError)?;
        Self::configure(&conn)?;
        debug!("Database opened at: {}", db_path.display());

        let db = Self {
            conn,
            path: db_path.to_path_buf(),
        };
        db.ensure_schema()?;

        Ok(db)
    }

    /// Private in-memory database; used by tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, PrefsError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.ensure_schema()?;
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Extensions read the shared file while the app writes it, so WAL plus
    // a busy timeout rather than the default rollback journal.
    fn configure(conn: &Connection) -> Result<(), PrefsError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!("journal_mode = {}", mode);
        Ok(())
    }

    fn ensure_schema(&self) -> Result<(), PrefsError> {
        let table_exists: bool = self
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='meta'",
                [],
                |row| row.get::<_, i32>(0),
            )
            .map(|count| count > 0)?;

        if !table_exists {
            info!("Creating preference schema in {}", self.path.display());
            self.conn.execute_batch(CREATE_SCHEMA_SQL)?;
            return Ok(());
        }

        let stored_version: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored_version.as_deref() {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(PrefsError::Error(format!(
                "Schema version mismatch in {}: expected {}, found {}",
                self.path.display(),
                SCHEMA_VERSION,
                other
            ))),
            None => Err(PrefsError::Error(format!(
                "Schema version missing in {}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_connect_creates_parent_dirs_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groups").join("group.test").join("preferences.db");

        let db = Database::connect(&path).unwrap();
        assert!(path.exists());

        let version: String = db
            .conn()
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_reconnect_keeps_existing_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.db");

        {
            let db = Database::connect(&path).unwrap();
            db.conn()
                .execute(
                    "INSERT INTO preferences (scope, key, kind, value) VALUES (?, ?, ?, ?)",
                    ["legacy", "k", "S", "v"],
                )
                .unwrap();
        }

        let db = Database::connect(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT count(*) FROM preferences", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.db");

        {
            let db = Database::connect(&path).unwrap();
            db.conn()
                .execute("UPDATE meta SET value = '99' WHERE key = 'schema_version'", [])
                .unwrap();
        }

        let err = Database::connect(&path).err().unwrap();
        assert!(err.to_string().contains("Schema version mismatch"));
    }
}
