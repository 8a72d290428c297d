//! One-hop migration of preferences and the signed-in credential from the
//! legacy single-app scope to the shared scope.
//!
//! [`VersionGate`] runs once per cold start. It overwrites the `Version`
//! marker before doing anything else and only runs [`MigrationEngine`]
//! when no marker existed, so the migration body is attempted at most once
//! per install, including when it is interrupted.

mod engine;
mod gate;
mod resolver;

pub use engine::MigrationEngine;
pub use gate::VersionGate;
pub use resolver::LegacyKeyResolver;

use log::warn;
use serde::Serialize;
use std::fmt;
use strum::{AsRefStr, Display, EnumIter};

use crate::error::PrefsError;

/// Identifier of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccountIdentifier(String);

impl AccountIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        AccountIdentifier(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, AsRefStr, Display, EnumIter, Debug, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MigrationStep {
    WriteVersionMarker,
    ResolveAccount,
    ReadCredential,
    RemoveLegacyAccountKeys,
    RemoveLegacyCredential,
    WriteCanonicalAccount,
    WriteSharedCredential,
    RollbackCanonicalAccount,
    MigrateFlags,
    DiscardDeprecatedKeys,
}

/// A store operation that failed and was stepped past.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SoftFailure {
    pub step: MigrationStep,
    pub message: String,
}

/// Collects soft failures for the report, logging each one as it happens.
#[derive(Debug, Default)]
pub struct SoftFailures(Vec<SoftFailure>);

impl SoftFailures {
    pub fn record(&mut self, step: MigrationStep, err: PrefsError) {
        warn!("Migration step '{}' failed, continuing: {}", step, err);
        self.0.push(SoftFailure {
            step,
            message: err.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<SoftFailure> {
        self.0
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub account: AccountIdentifier,
    /// A credential was present in the legacy secret store.
    pub secret_found: bool,
    /// Both the canonical account key and the shared credential were written.
    pub credential_relocated: bool,
    pub soft_failures: Vec<SoftFailure>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// A marker existed before this start; nothing but the marker was touched.
    Skipped { prior_marker: String },
    /// No legacy account key held a value. Flags are left alone.
    NoAccountToMigrate,
    Migrated(MigrationReport),
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::Skipped { prior_marker } => {
                write!(f, "Skipped (previous version marker '{}')", prior_marker)
            }
            MigrationOutcome::NoAccountToMigrate => write!(f, "No legacy account to migrate"),
            MigrationOutcome::Migrated(report) => {
                write!(
                    f,
                    "Migrated account '{}' (credential {}, {} soft failure(s))",
                    report.account,
                    if report.credential_relocated {
                        "relocated"
                    } else if report.secret_found {
                        "NOT relocated"
                    } else {
                        "not found"
                    },
                    report.soft_failures.len()
                )
            }
        }
    }
}
