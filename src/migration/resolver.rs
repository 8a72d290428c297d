use log::{debug, info, warn};

use super::{AccountIdentifier, MigrationStep, SoftFailures};
use crate::keys::legacy;
use crate::lookup::Lookup;
use crate::prefs::{PrefValue, PreferenceStore};

/// Reconciles the two legacy account keys into one identifier.
///
/// `LoggedUsername` wins when it holds a string and `Username` is left
/// alone. When only `Username` holds a value it is promoted, and the key is
/// deleted if `LoggedUsername` is known to be absent, whether or not a
/// credential exists for it.
pub struct LegacyKeyResolver<'a> {
    legacy_prefs: &'a dyn PreferenceStore,
}

impl<'a> LegacyKeyResolver<'a> {
    pub fn new(legacy_prefs: &'a dyn PreferenceStore) -> Self {
        Self { legacy_prefs }
    }

    pub fn resolve_account_identifier(
        &self,
        failures: &mut SoftFailures,
    ) -> Lookup<AccountIdentifier> {
        let username = self.read(legacy::USERNAME, failures);
        let logged_username = self.read(legacy::LOGGED_USERNAME, failures);

        if let Some(Lookup::Present(logged)) = &logged_username {
            if let Some(logged) = logged.as_string() {
                debug!("Legacy account found under '{}'", legacy::LOGGED_USERNAME);
                return Lookup::Present(AccountIdentifier::new(logged));
            }
            warn!(
                "Legacy '{}' is not a string ({}); ignoring it",
                legacy::LOGGED_USERNAME,
                logged.kind()
            );
        }

        match username.map(|value| value.and_then(|v| v.as_string())) {
            Some(Lookup::Present(older)) => {
                info!(
                    "Promoting legacy '{}' to the account identifier",
                    legacy::USERNAME
                );
                // Only clean up the old key once the new one is known to be absent.
                if logged_username.as_ref().is_some_and(Lookup::is_absent) {
                    if let Err(e) = self.legacy_prefs.remove(legacy::USERNAME) {
                        failures.record(MigrationStep::ResolveAccount, e);
                    }
                }
                Lookup::Present(AccountIdentifier::new(older))
            }
            _ => Lookup::Absent,
        }
    }

    /// Raw read, whatever the stored kind. `None` when the read itself failed.
    fn read(&self, key: &str, failures: &mut SoftFailures) -> Option<Lookup<PrefValue>> {
        match self.legacy_prefs.get(key) {
            Ok(value) => Some(value),
            Err(e) => {
                failures.record(MigrationStep::ResolveAccount, e);
                None
            }
        }
    }
}
