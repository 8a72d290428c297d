use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Secret, SecureCredentialStore};
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// In-process credential store for tests.
pub struct MemoryCredentialStore {
    scope: StoreScope,
    records: Mutex<BTreeMap<String, Secret>>,
}

impl MemoryCredentialStore {
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            records: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_records<I>(scope: StoreScope, records: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let records = records
            .into_iter()
            .map(|(account, secret)| (account.to_owned(), Secret::new(secret)))
            .collect();
        Self {
            scope,
            records: Mutex::new(records),
        }
    }

    /// Accounts that currently hold a record, in order.
    pub fn accounts(&self) -> Result<Vec<String>, PrefsError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Secret>>, PrefsError> {
        self.records
            .lock()
            .map_err(|_| {
                PrefsError::Error(format!("Credential store '{}' is poisoned", self.scope))
            })
    }
}

impl SecureCredentialStore for MemoryCredentialStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, account: &str) -> Result<Lookup<Secret>, PrefsError> {
        Ok(self.lock()?.get(account).cloned().into())
    }

    fn set(&self, account: &str, secret: &Secret) -> Result<(), PrefsError> {
        let mut records = self.lock().map_err(|e| PrefsError::SecretWriteFailed {
            account: account.to_owned(),
            reason: e.to_string(),
        })?;
        records.insert(account.to_owned(), secret.clone());
        Ok(())
    }

    fn remove(&self, account: &str) -> Result<(), PrefsError> {
        let mut records = self.lock().map_err(|e| PrefsError::SecretDeleteFailed {
            account: account.to_owned(),
            reason: e.to_string(),
        })?;
        records.remove(account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_by_account() {
        let store = MemoryCredentialStore::with_records(StoreScope::Legacy, [("alice", "pw1")]);
        assert_eq!(store.get("alice").unwrap(), Lookup::Present(Secret::new("pw1")));
        assert_eq!(store.get("bob").unwrap(), Lookup::Absent);

        store.set("bob", &Secret::new("pw2")).unwrap();
        assert_eq!(store.accounts().unwrap(), vec!["alice".to_string(), "bob".to_string()]);

        store.remove("alice").unwrap();
        store.remove("alice").unwrap();
        assert_eq!(store.accounts().unwrap(), vec!["bob".to_string()]);
    }
}
