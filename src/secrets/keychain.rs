use keyring::Entry;
use log::debug;

use super::{Secret, SecureCredentialStore};
use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// Credential store backed by the OS keyring (Keychain, Credential Manager,
/// kernel keyutils).
///
/// Each record is a keyring entry addressed by `(scope id, account)`, so the
/// legacy and shared scopes map to different services.
pub struct KeyringCredentialStore {
    scope: StoreScope,
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(scope: StoreScope) -> Self {
        let service = scope.scope_id();
        Self { scope, service }
    }

    fn entry(&self, account: &str) -> keyring::Result<Entry> {
        Entry::new(&self.service, account)
    }
}

impl SecureCredentialStore for KeyringCredentialStore {
    fn scope(&self) -> &StoreScope {
        &self.scope
    }

    fn get(&self, account: &str) -> Result<Lookup<Secret>, PrefsError> {
        read_result(
            account,
            self.entry(account).and_then(|entry| entry.get_password()),
        )
    }

    fn set(&self, account: &str, secret: &Secret) -> Result<(), PrefsError> {
        write_result(
            account,
            self.entry(account)
                .and_then(|entry| entry.set_password(secret.expose())),
        )
    }

    fn remove(&self, account: &str) -> Result<(), PrefsError> {
        delete_result(
            account,
            self.entry(account).and_then(|entry| entry.delete_credential()),
        )
    }
}

fn read_result(
    account: &str,
    result: keyring::Result<String>,
) -> Result<Lookup<Secret>, PrefsError> {
    match result {
        Ok(password) => Ok(Lookup::Present(Secret::new(password))),
        Err(keyring::Error::NoEntry) => Ok(Lookup::Absent),
        Err(e) => Err(PrefsError::Error(format!(
            "Failed to read keyring entry for account '{}': {}",
            account, e
        ))),
    }
}

fn write_result(account: &str, result: keyring::Result<()>) -> Result<(), PrefsError> {
    result.map_err(|e| PrefsError::SecretWriteFailed {
        account: account.to_owned(),
        reason: e.to_string(),
    })
}

fn delete_result(account: &str, result: keyring::Result<()>) -> Result<(), PrefsError> {
    match result {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => {
            debug!("No keyring entry to delete for account '{}'", account);
            Ok(())
        }
        Err(e) => Err(PrefsError::SecretDeleteFailed {
            account: account.to_owned(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_failure(reason: &str) -> keyring::Error {
        keyring::Error::PlatformFailure(Box::new(std::io::Error::other(reason.to_owned())))
    }

    #[test]
    fn test_service_is_the_scope_id() {
        let legacy = KeyringCredentialStore::new(StoreScope::Legacy);
        let shared = KeyringCredentialStore::new(StoreScope::shared("TEAM", "group.test"));
        assert_eq!(legacy.service, "legacy");
        assert_eq!(shared.service, StoreScope::shared("TEAM", "group.test").scope_id());
        assert_ne!(legacy.service, shared.service);
    }

    #[test]
    fn test_missing_entry_reads_absent() {
        assert_eq!(
            read_result("alice", Err(keyring::Error::NoEntry)).unwrap(),
            Lookup::Absent
        );
        assert_eq!(
            read_result("alice", Ok("pw1".to_string())).unwrap(),
            Lookup::Present(Secret::new("pw1"))
        );
        assert!(read_result("alice", Err(platform_failure("locked"))).is_err());
    }

    #[test]
    fn test_write_failure_maps_to_secret_write_failed() {
        let err = write_result("alice", Err(platform_failure("read-only"))).unwrap_err();
        assert!(
            matches!(err, PrefsError::SecretWriteFailed { ref account, ref reason }
                if account == "alice" && reason.contains("read-only"))
        );
        assert!(write_result("alice", Ok(())).is_ok());
    }

    #[test]
    fn test_deleting_missing_entry_succeeds() {
        assert!(delete_result("alice", Err(keyring::Error::NoEntry)).is_ok());

        let err = delete_result("alice", Err(platform_failure("locked"))).unwrap_err();
        assert!(matches!(err, PrefsError::SecretDeleteFailed { .. }));
        assert!(err.is_soft());
    }
}
