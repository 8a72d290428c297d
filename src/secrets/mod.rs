mod keychain;
#[cfg(test)]
mod memory;
mod sqlite;

pub use keychain::KeyringCredentialStore;
#[cfg(test)]
pub use memory::MemoryCredentialStore;
pub use sqlite::SqliteCredentialStore;

use std::fmt;

use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// A stored password or token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Scoped secret store keyed by account identifier.
pub trait SecureCredentialStore {
    fn scope(&self) -> &StoreScope;

    /// A missing record is `Absent`, never an error.
    fn get(&self, account: &str) -> Result<Lookup<Secret>, PrefsError>;

    /// Fails with `SecretWriteFailed`.
    fn set(&self, account: &str, secret: &Secret) -> Result<(), PrefsError>;

    /// Fails with `SecretDeleteFailed`. Removing a missing record succeeds.
    fn remove(&self, account: &str) -> Result<(), PrefsError>;
}
