use log::{info, warn};

use super::{MigrationEngine, MigrationOutcome, MigrationStep, SoftFailures};
use crate::config::{AppConfig, RelocationOrder};
use crate::context::StoreContext;
use crate::error::PrefsError;
use crate::keys;
use crate::lookup::Lookup;
use crate::prefs::PrefValue;

/// Decides, once per cold start, whether the legacy migration runs.
pub struct VersionGate {
    current_version: String,
    relocation_order: RelocationOrder,
}

impl VersionGate {
    /// Reported as the prior marker when the stored one could not be read.
    const UNREADABLE_MARKER: &'static str = "<unreadable>";

    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
            relocation_order: RelocationOrder::default(),
        }
    }

    pub fn from_config(app: &AppConfig) -> Self {
        Self::new(app.current_version.clone()).with_relocation_order(app.relocation_order)
    }

    pub fn with_relocation_order(mut self, relocation_order: RelocationOrder) -> Self {
        self.relocation_order = relocation_order;
        self
    }

    /// Overwrites the version marker, then migrates only if there was no
    /// marker before this call.
    ///
    /// The marker write comes first and is never rolled back, so a
    /// migration interrupted part way is not retried on the next start. A
    /// marker that cannot be read counts as present. A failed marker write
    /// is a soft failure. Only hard errors (see [`PrefsError::is_soft`]) are
    /// returned.
    pub fn run_startup_migration(
        &self,
        ctx: &StoreContext,
    ) -> Result<MigrationOutcome, PrefsError> {
        let shared_prefs = ctx.shared_prefs();

        // Raw read: any stored value counts, whatever its kind.
        let prior_marker = match shared_prefs.get(keys::VERSION) {
            Ok(Lookup::Present(prior)) => {
                Lookup::Present(prior.as_string().unwrap_or_else(|| prior.encode()))
            }
            Ok(Lookup::Absent) => Lookup::Absent,
            Err(e) if e.is_soft() => {
                warn!("Version marker unreadable, treating it as present: {}", e);
                Lookup::Present(Self::UNREADABLE_MARKER.to_owned())
            }
            Err(e) => return Err(e),
        };

        let mut marker_failures = SoftFailures::default();
        let current = PrefValue::from(self.current_version.as_str());
        if let Err(e) = shared_prefs.set(keys::VERSION, current) {
            if !e.is_soft() {
                return Err(e);
            }
            marker_failures.record(MigrationStep::WriteVersionMarker, e);
        }

        if let Lookup::Present(prior_marker) = prior_marker {
            info!(
                "Version marker '{}' present, now '{}'; skipping legacy migration",
                prior_marker, self.current_version
            );
            return Ok(MigrationOutcome::Skipped { prior_marker });
        }

        info!(
            "No version marker; migrating legacy state to version '{}'",
            self.current_version
        );

        let Some(legacy) = ctx.legacy() else {
            warn!("Legacy stores unavailable; treating install as signed out");
            return Ok(MigrationOutcome::NoAccountToMigrate);
        };

        let mut outcome = MigrationEngine::new(
            legacy.prefs.as_ref(),
            legacy.secrets.as_ref(),
            shared_prefs,
            ctx.shared_secrets(),
        )
        .with_relocation_order(self.relocation_order)
        .migrate_legacy_state();

        if let MigrationOutcome::Migrated(report) = &mut outcome {
            report.soft_failures.splice(0..0, marker_failures.into_vec());
        }

        Ok(outcome)
    }
}
