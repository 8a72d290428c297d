use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{PrefValue, PreferenceStore};
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// In-process preference store for tests.
pub struct MemoryPreferenceStore {
    scope: StoreScope,
    entries: Mutex<BTreeMap<String, PrefValue>>,
}

impl MemoryPreferenceStore {
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_entries<K, V, I>(scope: StoreScope, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<PrefValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            scope,
            entries: Mutex::new(entries),
        }
    }

    /// Copy of every entry, ordered by key.
    pub fn snapshot(&self) -> Result<BTreeMap<String, PrefValue>, PrefsError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, PrefValue>>, PrefsError> {
        self.entries
            .lock()
            .map_err(|_| {
                PrefsError::Error(format!("Preference store '{}' is poisoned", self.scope))
            })
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, key: &str) -> Result<Lookup<PrefValue>, PrefsError> {
        Ok(self.lock()?.get(key).cloned().into())
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<(), PrefsError> {
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PrefsError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryPreferenceStore::new(StoreScope::Legacy);
        assert_eq!(store.get("Username").unwrap(), Lookup::Absent);

        store.set("Username", "alice".into()).unwrap();
        assert_eq!(
            store.get_string("Username").unwrap(),
            Lookup::Present("alice".to_string())
        );

        store.remove("Username").unwrap();
        store.remove("Username").unwrap();
        assert!(store.get("Username").unwrap().is_absent());
    }

    #[test]
    fn test_with_entries_mixes_value_kinds() {
        let store = MemoryPreferenceStore::with_entries(
            StoreScope::Legacy,
            [
                ("FirstLaunch", PrefValue::Bool(false)),
                ("Theme", PrefValue::Int(1)),
            ],
        );
        assert_eq!(store.get_bool("FirstLaunch").unwrap(), Lookup::Present(false));
        assert_eq!(store.get_int("Theme").unwrap(), Lookup::Present(1));
        assert_eq!(store.snapshot().unwrap().len(), 2);
    }
}
