use log::{debug, info, warn, Level};
use logging_timer::timer;

use super::{
    AccountIdentifier, LegacyKeyResolver, MigrationOutcome, MigrationReport, MigrationStep,
    SoftFailures,
};
use crate::config::RelocationOrder;
use crate::error::PrefsError;
use crate::keys::{self, legacy};
use crate::lookup::Lookup;
use crate::prefs::{PrefValue, PreferenceStore};
use crate::secrets::{Secret, SecureCredentialStore};

/// Moves legacy account, credential and flags into the shared scope.
///
/// Every store failure past account resolution is soft: it is logged,
/// recorded in the report, and the remaining steps still run.
pub struct MigrationEngine<'a> {
    legacy_prefs: &'a dyn PreferenceStore,
    legacy_secrets: &'a dyn SecureCredentialStore,
    shared_prefs: &'a dyn PreferenceStore,
    shared_secrets: &'a dyn SecureCredentialStore,
    relocation_order: RelocationOrder,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(
        legacy_prefs: &'a dyn PreferenceStore,
        legacy_secrets: &'a dyn SecureCredentialStore,
        shared_prefs: &'a dyn PreferenceStore,
        shared_secrets: &'a dyn SecureCredentialStore,
    ) -> Self {
        Self {
            legacy_prefs,
            legacy_secrets,
            shared_prefs,
            shared_secrets,
            relocation_order: RelocationOrder::default(),
        }
    }

    pub fn with_relocation_order(mut self, relocation_order: RelocationOrder) -> Self {
        self.relocation_order = relocation_order;
        self
    }

    pub fn migrate_legacy_state(&self) -> MigrationOutcome {
        let _tmr = timer!(Level::Trace; "MigrationEngine::migrate_legacy_state");
        debug!(
            "Migrating prefs '{}' -> '{}', secrets '{}' -> '{}'",
            self.legacy_prefs.scope(),
            self.shared_prefs.scope(),
            self.legacy_secrets.scope(),
            self.shared_secrets.scope()
        );
        let mut failures = SoftFailures::default();

        // 1. No legacy account means logged out or a fresh install
        let account = match LegacyKeyResolver::new(self.legacy_prefs)
            .resolve_account_identifier(&mut failures)
        {
            Lookup::Present(account) => account,
            Lookup::Absent => {
                info!("No legacy account found, nothing to migrate");
                return MigrationOutcome::NoAccountToMigrate;
            }
        };

        // 2. + 3.
        let secret = self.read_legacy_secret(&account, &mut failures);
        let secret_found = secret.is_present();
        let credential_relocated = match secret {
            Lookup::Present(secret) => match self.relocation_order {
                RelocationOrder::DeleteThenWrite => {
                    self.delete_then_write(&account, &secret, &mut failures)
                }
                RelocationOrder::WriteThenDelete => {
                    self.write_then_delete(&account, &secret, &mut failures)
                }
            },
            Lookup::Absent => false,
        };

        // 4.
        self.migrate_flags(&mut failures);

        // 5.
        self.discard_deprecated_keys(&mut failures);

        if failures.is_empty() {
            info!(
                "Legacy state migrated for account '{}' (credential relocated: {})",
                account, credential_relocated
            );
        } else {
            warn!(
                "Account '{}' migrated with soft failures (credential relocated: {})",
                account, credential_relocated
            );
        }

        MigrationOutcome::Migrated(MigrationReport {
            account,
            secret_found,
            credential_relocated,
            soft_failures: failures.into_vec(),
        })
    }

    fn read_legacy_secret(
        &self,
        account: &AccountIdentifier,
        failures: &mut SoftFailures,
    ) -> Lookup<Secret> {
        match self.legacy_secrets.get(account.as_str()) {
            Ok(Lookup::Present(secret)) => Lookup::Present(secret),
            Ok(Lookup::Absent) => {
                info!(
                    "{}; account keys stay in the legacy store",
                    PrefsError::SecretNotFound {
                        account: account.to_string()
                    }
                );
                Lookup::Absent
            }
            Err(e) => {
                failures.record(MigrationStep::ReadCredential, e);
                Lookup::Absent
            }
        }
    }

    // Removes legacy state before the shared writes are confirmed. If the
    // process dies between the two, the credential is gone and the user has
    // to sign in again.
    fn delete_then_write(
        &self,
        account: &AccountIdentifier,
        secret: &Secret,
        failures: &mut SoftFailures,
    ) -> bool {
        self.remove_legacy_account_keys(failures);
        self.remove_legacy_secret(account, failures);

        let account_written = self.write_canonical_account(account, failures);
        let secret_written = self.write_shared_secret(account, secret, failures);

        account_written && secret_written
    }

    fn write_then_delete(
        &self,
        account: &AccountIdentifier,
        secret: &Secret,
        failures: &mut SoftFailures,
    ) -> bool {
        if !self.write_canonical_account(account, failures) {
            return false;
        }
        if !self.write_shared_secret(account, secret, failures) {
            if let Err(e) = self.shared_prefs.remove(keys::LOGGED_USERNAME) {
                failures.record(MigrationStep::RollbackCanonicalAccount, e);
            }
            return false;
        }

        self.remove_legacy_account_keys(failures);
        self.remove_legacy_secret(account, failures);
        true
    }

    fn remove_legacy_account_keys(&self, failures: &mut SoftFailures) {
        for key in legacy::ACCOUNT_KEYS {
            if let Err(e) = self.legacy_prefs.remove(key) {
                failures.record(MigrationStep::RemoveLegacyAccountKeys, e);
            }
        }
    }

    fn remove_legacy_secret(&self, account: &AccountIdentifier, failures: &mut SoftFailures) {
        if let Err(e) = self.legacy_secrets.remove(account.as_str()) {
            failures.record(MigrationStep::RemoveLegacyCredential, e);
        }
    }

    fn write_canonical_account(
        &self,
        account: &AccountIdentifier,
        failures: &mut SoftFailures,
    ) -> bool {
        match self
            .shared_prefs
            .set(keys::LOGGED_USERNAME, PrefValue::from(account.as_str()))
        {
            Ok(()) => true,
            Err(e) => {
                failures.record(MigrationStep::WriteCanonicalAccount, e);
                false
            }
        }
    }

    fn write_shared_secret(
        &self,
        account: &AccountIdentifier,
        secret: &Secret,
        failures: &mut SoftFailures,
    ) -> bool {
        match self.shared_secrets.set(account.as_str(), secret) {
            Ok(()) => true,
            Err(e) => {
                failures.record(MigrationStep::WriteSharedCredential, e);
                false
            }
        }
    }

    // Launched is the inverse of the legacy FirstLaunch; an absent legacy
    // flag reads as false for both. A flag whose legacy read fails is left
    // unwritten.
    fn migrate_flags(&self, failures: &mut SoftFailures) {
        match self.legacy_prefs.get_bool(legacy::FIRST_LAUNCH) {
            Ok(first_launch) => {
                let was_launched = !first_launch.or(false);
                if let Err(e) = self
                    .shared_prefs
                    .set(keys::LAUNCHED, PrefValue::Bool(was_launched))
                {
                    failures.record(MigrationStep::MigrateFlags, e);
                }
            }
            Err(e) => failures.record(MigrationStep::MigrateFlags, e),
        }

        match self
            .legacy_prefs
            .get_bool(legacy::DID_ASK_TO_ENABLE_NOTIFICATIONS)
        {
            Ok(did_ask) => {
                if let Err(e) = self.shared_prefs.set(
                    keys::DID_ASK_TO_ENABLE_NOTIFICATIONS,
                    PrefValue::Bool(did_ask.or(false)),
                ) {
                    failures.record(MigrationStep::MigrateFlags, e);
                }
            }
            Err(e) => failures.record(MigrationStep::MigrateFlags, e),
        }
    }

    fn discard_deprecated_keys(&self, failures: &mut SoftFailures) {
        for key in legacy::DEPRECATED {
            if let Err(e) = self.legacy_prefs.remove(key) {
                failures.record(MigrationStep::DiscardDeprecatedKeys, e);
            }
        }
    }
}
