use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::{PrefKind, PrefValue, PreferenceStore};
use crate::database::Database;
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// Preference store persisted in the `preferences` table of a [`Database`].
pub struct SqlitePreferenceStore {
    db: Database,
    scope: StoreScope,
    scope_id: String,
}

impl SqlitePreferenceStore {
    pub fn open(db_path: &Path, scope: StoreScope) -> Result<Self, PrefsError> {
        Ok(Self::with_database(Database::connect(db_path)?, scope))
    }

    pub fn with_database(db: Database, scope: StoreScope) -> Self {
        let scope_id = scope.scope_id();
        Self { db, scope, scope_id }
    }

    pub fn db_path(&self) -> &Path {
        self.db.path()
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, key: &str) -> Result<Lookup<PrefValue>, PrefsError> {
        let row: Option<(String, String)> = self
            .db
            .conn()
            .query_row(
                "SELECT kind, value FROM preferences WHERE scope = ? AND key = ?",
                params![self.scope_id, key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(Lookup::Absent),
            Some((kind, raw)) => {
                let kind: PrefKind = kind.parse().map_err(|_| {
                    PrefsError::Error(format!(
                        "Unknown preference kind '{}' for key '{}'",
                        kind, key
                    ))
                })?;
                Ok(Lookup::Present(PrefValue::decode(kind, raw)?))
            }
        }
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<(), PrefsError> {
        self.db.conn().execute(
            "INSERT OR REPLACE INTO preferences (scope, key, kind, value) VALUES (?, ?, ?, ?)",
            params![self.scope_id, key, value.kind().as_ref(), value.encode()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PrefsError> {
        self.db.conn().execute(
            "DELETE FROM preferences WHERE scope = ? AND key = ?",
            params![self.scope_id, key],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_keep_their_kind() {
        let store = SqlitePreferenceStore::with_database(
            Database::in_memory().unwrap(),
            StoreScope::Legacy,
        );

        store.set("FirstLaunch", PrefValue::Bool(true)).unwrap();
        store.set("Theme", PrefValue::Int(1)).unwrap();
        store.set("Username", PrefValue::from("alice")).unwrap();

        assert_eq!(store.get("FirstLaunch").unwrap(), Lookup::Present(PrefValue::Bool(true)));
        assert_eq!(store.get("Theme").unwrap(), Lookup::Present(PrefValue::Int(1)));
        assert_eq!(
            store.get("Username").unwrap(),
            Lookup::Present(PrefValue::Str("alice".to_string()))
        );
    }

    #[test]
    fn test_set_overwrites_and_remove_is_idempotent() {
        let store = SqlitePreferenceStore::with_database(
            Database::in_memory().unwrap(),
            StoreScope::Legacy,
        );

        store.set("Version", "2.2".into()).unwrap();
        store.set("Version", "3.0".into()).unwrap();
        assert_eq!(store.get_string("Version").unwrap(), Lookup::Present("3.0".to_string()));

        store.remove("Version").unwrap();
        store.remove("Version").unwrap();
        assert_eq!(store.get("Version").unwrap(), Lookup::Absent);
    }

    #[test]
    fn test_scopes_in_one_file_are_isolated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.db");

        let legacy = SqlitePreferenceStore::open(&path, StoreScope::Legacy).unwrap();
        let shared =
            SqlitePreferenceStore::open(&path, StoreScope::shared("TEAM", "group.test")).unwrap();

        legacy.set("LoggedUsername", "alice".into()).unwrap();
        assert!(shared.get("LoggedUsername").unwrap().is_absent());

        shared.set("LoggedUsername", "bob".into()).unwrap();
        assert_eq!(
            legacy.get_string("LoggedUsername").unwrap(),
            Lookup::Present("alice".to_string())
        );
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.db");
        let scope = StoreScope::shared("TEAM", "group.test");

        {
            let store = SqlitePreferenceStore::open(&path, scope.clone()).unwrap();
            store.set("Launched", PrefValue::Bool(true)).unwrap();
        }

        let store = SqlitePreferenceStore::open(&path, scope).unwrap();
        assert_eq!(store.get_bool("Launched").unwrap(), Lookup::Present(true));
        assert_eq!(store.db_path(), path.as_path());
    }
}
