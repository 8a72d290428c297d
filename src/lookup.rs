use serde::Serialize;

/// Result of reading a single key.
///
/// Stores never silently default: a missing key comes back as `Absent`
/// and each caller states the value it falls back to with [`Lookup::or`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Lookup<T> {
    Absent,
    Present(T),
}

impl<T> Lookup<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    pub fn or(self, default: T) -> T {
        match self {
            Lookup::Present(value) => value,
            Lookup::Absent => default,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Present(value) => Lookup::Present(f(value)),
            Lookup::Absent => Lookup::Absent,
        }
    }

    /// Like `map`, but a value that does not convert becomes `Absent`.
    pub fn and_then<U, F: FnOnce(T) -> Option<U>>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Present(value) => f(value).into(),
            Lookup::Absent => Lookup::Absent,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Present(v),
            None => Lookup::Absent,
        }
    }
}
