use log::{debug, info, warn};
use std::path::Path;

use crate::config::{Config, CredentialBackend};
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::prefs::{PreferenceStore, SqlitePreferenceStore};
use crate::scope::StoreScope;
use crate::secrets::{
    KeyringCredentialStore, Secret, SecureCredentialStore, SqliteCredentialStore,
};

/// Preference and credential store of one scope.
pub struct ScopedStores {
    pub prefs: Box<dyn PreferenceStore>,
    pub secrets: Box<dyn SecureCredentialStore>,
}

/// Store handles for both scopes, built once at startup and passed to
/// whatever needs them.
pub struct StoreContext {
    shared: ScopedStores,
    legacy: Option<ScopedStores>,
}

impl StoreContext {
    pub fn new(shared: ScopedStores, legacy: Option<ScopedStores>) -> Self {
        Self { shared, legacy }
    }

    /// Opens the preference databases named by `config` and the configured
    /// credential backend for each scope.
    ///
    /// Failing to open the shared preference store is fatal. Every other
    /// failure is logged: missing legacy stores mean there is nothing to
    /// migrate, and a missing shared credential store makes each secret
    /// write fail softly.
    pub fn open(config: &Config) -> Result<Self, PrefsError> {
        let shared_scope = StoreScope::shared(&config.app.team_id, &config.app.app_group);
        let shared_path = config.shared_db_path();

        let shared_prefs = SqlitePreferenceStore::open(&shared_path, shared_scope.clone())
            .map_err(|e| PrefsError::StoreUnavailable {
                scope: shared_scope.scope_id(),
                reason: e.to_string(),
            })?;
        info!("Shared preferences at {}", shared_prefs.db_path().display());

        let backend = config.storage.credential_backend;
        let shared_secrets: Box<dyn SecureCredentialStore> =
            match Self::open_secrets(backend, &shared_path, shared_scope.clone()) {
                Ok(store) => store,
                Err(e) => {
                    warn!("Shared credential store unavailable: {}", e);
                    Box::new(UnavailableCredentialStore {
                        scope: shared_scope,
                        reason: e.to_string(),
                    })
                }
            };

        let legacy_path = config.legacy_db_path();
        let legacy = match Self::open_legacy(backend, &legacy_path) {
            Ok(stores) => Some(stores),
            Err(e) => {
                warn!(
                    "Legacy stores at {} unavailable: {}",
                    legacy_path.display(),
                    e
                );
                None
            }
        };

        Ok(Self::new(
            ScopedStores {
                prefs: Box::new(shared_prefs),
                secrets: shared_secrets,
            },
            legacy,
        ))
    }

    fn open_legacy(
        backend: CredentialBackend,
        path: &Path,
    ) -> Result<ScopedStores, PrefsError> {
        Ok(ScopedStores {
            prefs: Box::new(SqlitePreferenceStore::open(path, StoreScope::Legacy)?),
            secrets: Self::open_secrets(backend, path, StoreScope::Legacy)?,
        })
    }

    fn open_secrets(
        backend: CredentialBackend,
        db_path: &Path,
        scope: StoreScope,
    ) -> Result<Box<dyn SecureCredentialStore>, PrefsError> {
        debug!("Credential backend for scope '{}': {}", scope, backend);
        let store: Box<dyn SecureCredentialStore> = match backend {
            CredentialBackend::Keyring => Box::new(KeyringCredentialStore::new(scope)),
            CredentialBackend::Sqlite => Box::new(SqliteCredentialStore::open(db_path, scope)?),
        };
        Ok(store)
    }

    pub fn shared_prefs(&self) -> &dyn PreferenceStore {
        self.shared.prefs.as_ref()
    }

    pub fn shared_secrets(&self) -> &dyn SecureCredentialStore {
        self.shared.secrets.as_ref()
    }

    pub fn legacy(&self) -> Option<&ScopedStores> {
        self.legacy.as_ref()
    }
}

/// Stands in for a credential store that could not be opened.
struct UnavailableCredentialStore {
    scope: StoreScope,
    reason: String,
}

impl SecureCredentialStore for UnavailableCredentialStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, _account: &str) -> Result<Lookup<Secret>, PrefsError> {
        Err(PrefsError::Error(format!(
            "Credential store '{}' unavailable: {}",
            self.scope, self.reason
        )))
    }

    fn set(&self, account: &str, _secret: &Secret) -> Result<(), PrefsError> {
        Err(PrefsError::SecretWriteFailed {
            account: account.to_owned(),
            reason: self.reason.clone(),
        })
    }

    fn remove(&self, account: &str) -> Result<(), PrefsError> {
        Err(PrefsError::SecretDeleteFailed {
            account: account.to_owned(),
            reason: self.reason.clone(),
        })
    }
}
