use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError),

    /// The store for `scope` could not be opened. Fatal only for the shared scope.
    #[error("Store unavailable for scope '{scope}': {reason}")]
    StoreUnavailable { scope: String, reason: String },

    #[error("No stored secret for account '{account}'")]
    SecretNotFound { account: String },

    #[error("Failed to write secret for account '{account}': {reason}")]
    SecretWriteFailed { account: String, reason: String },

    #[error("Failed to delete secret for account '{account}': {reason}")]
    SecretDeleteFailed { account: String, reason: String },

    #[error("Error: {0}")]
    Error(String),
}

impl PrefsError {
    /// True for errors the migration engine logs and steps past.
    pub fn is_soft(&self) -> bool {
        !matches!(self, PrefsError::StoreUnavailable { .. })
    }
}
