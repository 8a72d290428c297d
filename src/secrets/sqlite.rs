use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::{Secret, SecureCredentialStore};
use crate::database::Database;
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// Credential store persisted in the `credentials` table of a [`Database`].
///
/// Fallback for hosts without a usable keyring: secrets are stored as given
/// and protecting the file is left to the platform.
pub struct SqliteCredentialStore {
    db: Database,
    scope: StoreScope,
    scope_id: String,
}

impl SqliteCredentialStore {
    pub fn open(db_path: &Path, scope: StoreScope) -> Result<Self, PrefsError> {
        Ok(Self::with_database(Database::connect(db_path)?, scope))
    }

    pub fn with_database(db: Database, scope: StoreScope) -> Self {
        let scope_id = scope.scope_id();
        Self { db, scope, scope_id }
    }
}

impl SecureCredentialStore for SqliteCredentialStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, account: &str) -> Result<Lookup<Secret>, PrefsError> {
        let secret: Option<String> = self
            .db
            .conn()
            .query_row(
                "SELECT secret FROM credentials WHERE scope = ? AND account = ?",
                params![self.scope_id, account],
                |row| row.get(0),
            )
            .optional()?;
        Ok(Lookup::from(secret).map(Secret::new))
    }

    fn set(&self, account: &str, secret: &Secret) -> Result<(), PrefsError> {
        self.db
            .conn()
            .execute(
                "INSERT OR REPLACE INTO credentials (scope, account, secret) VALUES (?, ?, ?)",
                params![self.scope_id, account, secret.expose()],
            )
            .map_err(|e| PrefsError::SecretWriteFailed {
                account: account.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn remove(&self, account: &str) -> Result<(), PrefsError> {
        self.db
            .conn()
            .execute(
                "DELETE FROM credentials WHERE scope = ? AND account = ?",
                params![self.scope_id, account],
            )
            .map_err(|e| PrefsError::SecretDeleteFailed {
                account: account.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
