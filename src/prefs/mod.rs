#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryPreferenceStore;
pub use sqlite::SqlitePreferenceStore;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::PrefsError;
use crate::lookup::Lookup;
use crate::scope::StoreScope;

/// Value kinds a preference store accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Single-character storage tag for a `PrefValue`.
#[derive(AsRefStr, EnumIter, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
pub enum PrefKind {
    #[strum(serialize = "B")]
    Bool,
    #[strum(serialize = "I")]
    Int,
    #[strum(serialize = "S")]
    Str,
}

impl PrefValue {
    pub fn kind(&self) -> PrefKind {
        match self {
            PrefValue::Bool(_) => PrefKind::Bool,
            PrefValue::Int(_) => PrefKind::Int,
            PrefValue::Str(_) => PrefKind::Str,
        }
    }

    /// Boolean reading of the value. Integers are true when non-zero, strings
    /// when they spell a truthy word or a non-zero number.
    pub fn as_bool(&self) -> bool {
        match self {
            PrefValue::Bool(b) => *b,
            PrefValue::Int(i) => *i != 0,
            PrefValue::Str(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true")
                    || s.eq_ignore_ascii_case("yes")
                    || s.parse::<i64>().map(|i| i != 0).unwrap_or(false)
            }
        }
    }

    /// Integer reading of the value; `None` for strings that are not numbers.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrefValue::Bool(b) => Some(i64::from(*b)),
            PrefValue::Int(i) => Some(*i),
            PrefValue::Str(s) => s.trim().parse().ok(),
        }
    }

    /// String reading of the value; booleans have none.
    pub fn as_string(&self) -> Option<String> {
        match self {
            PrefValue::Bool(_) => None,
            PrefValue::Int(i) => Some(i.to_string()),
            PrefValue::Str(s) => Some(s.clone()),
        }
    }

    /// Text form used by the SQLite backend together with `kind()`.
    pub(crate) fn encode(&self) -> String {
        match self {
            PrefValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            PrefValue::Int(i) => i.to_string(),
            PrefValue::Str(s) => s.clone(),
        }
    }

    pub(crate) fn decode(kind: PrefKind, raw: String) -> Result<Self, PrefsError> {
        match kind {
            PrefKind::Bool => Ok(PrefValue::Bool(raw == "1")),
            PrefKind::Int => raw
                .parse()
                .map(PrefValue::Int)
                .map_err(|e| PrefsError::Error(format!("Invalid stored integer '{}': {}", raw, e))),
            PrefKind::Str => Ok(PrefValue::Str(raw)),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::Str(value.to_owned())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::Str(value)
    }
}

/// Scoped key-value store.
///
/// Each operation is atomic for its single key; there is no multi-key
/// transaction.
pub trait PreferenceStore {
    fn scope(&self) -> &StoreScope;

    fn get(&self, key: &str) -> Result<Lookup<PrefValue>, PrefsError>;

    fn set(&self, key: &str, value: PrefValue) -> Result<(), PrefsError>;

    /// Removing a key that is not present succeeds.
    fn remove(&self, key: &str) -> Result<(), PrefsError>;

    fn get_bool(&self, key: &str) -> Result<Lookup<bool>, PrefsError> {
        Ok(self.get(key)?.map(|v| v.as_bool()))
    }

    fn get_int(&self, key: &str) -> Result<Lookup<i64>, PrefsError> {
        Ok(self.get(key)?.and_then(|v| v.as_int()))
    }

    fn get_string(&self, key: &str) -> Result<Lookup<String>, PrefsError> {
        Ok(self.get(key)?.and_then(|v| v.as_string()))
    }
}
