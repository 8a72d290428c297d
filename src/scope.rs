use std::fmt;

/// Addressing scope of a preference or credential store.
///
/// Two stores with different scopes never observe each other's entries,
/// even when they are backed by the same database file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// Private storage of the main app, written by releases before 3.0.
    Legacy,
    /// Storage shared by the main app and its extensions.
    Shared { team_id: String, app_group: String },
}

impl StoreScope {
    const LEGACY_ID: &'static str = "legacy";

    pub fn shared(team_id: impl Into<String>, app_group: impl Into<String>) -> Self {
        StoreScope::Shared {
            team_id: team_id.into(),
            app_group: app_group.into(),
        }
    }

    /// Stable identifier stored alongside every row owned by this scope.
    ///
    /// Shared ids are `<team>/<group>` with `\\` and `/` escaped in the team
    /// part, so distinct `(team, group)` pairs never share an id and no
    /// shared id equals the legacy one.
    pub fn scope_id(&self) -> String {
        match self {
            StoreScope::Legacy => Self::LEGACY_ID.to_owned(),
            StoreScope::Shared { team_id, app_group } => {
                let team = team_id.replace('\\', "\\\\").replace('/', "\\/");
                format!("{}/{}", team, app_group)
            }
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope_id())
    }
}
