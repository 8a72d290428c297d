use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

use crate::error::PrefsError;
use crate::keys;
use crate::lookup::Lookup;
use crate::migration::AccountIdentifier;
use crate::prefs::{PrefValue, PreferenceStore};

/// Stored as its integer code; parsed from and displayed as a lowercase name.
#[derive(
    Serialize, AsRefStr, Display, EnumIter, EnumString, FromRepr, Debug, PartialEq, Eq, Copy, Clone,
)]
#[strum(serialize_all = "lowercase")]
#[repr(i64)]
pub enum ThemeCode {
    Light = 0,
    Dark = 1,
}

/// Last known VPN connection state, stored as its raw string.
#[derive(
    Serialize, AsRefStr, Display, EnumIter, EnumString, Debug, PartialEq, Eq, Copy, Clone,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VpnStatus {
    Connected,
    Connecting,
    Disconnected,
    Disconnecting,
}

/// Typed view of the canonical preferences in the shared scope.
///
/// Absent keys read as the registered default of each accessor. The
/// version marker is the exception: it is returned raw.
pub struct AppPreferences<'a> {
    store: &'a dyn PreferenceStore,
}

impl<'a> AppPreferences<'a> {
    const DEFAULT_THEME: ThemeCode = ThemeCode::Light;
    const DEFAULT_STATUS: VpnStatus = VpnStatus::Disconnected;

    pub fn new(store: &'a dyn PreferenceStore) -> Self {
        Self { store }
    }

    pub fn version_marker(&self) -> Result<Lookup<String>, PrefsError> {
        self.store.get_string(keys::VERSION)
    }

    pub fn logged_username(&self) -> Result<Lookup<AccountIdentifier>, PrefsError> {
        Ok(self
            .store
            .get_string(keys::LOGGED_USERNAME)?
            .map(AccountIdentifier::new))
    }

    pub fn was_launched(&self) -> Result<bool, PrefsError> {
        Ok(self.store.get_bool(keys::LAUNCHED)?.or(false))
    }

    pub fn set_was_launched(&self, value: bool) -> Result<(), PrefsError> {
        self.store.set(keys::LAUNCHED, PrefValue::Bool(value))
    }

    pub fn did_see_content_blocker(&self) -> Result<bool, PrefsError> {
        Ok(self.store.get_bool(keys::SEEN_CONTENT_BLOCKER)?.or(false))
    }

    pub fn set_did_see_content_blocker(&self, value: bool) -> Result<(), PrefsError> {
        self.store.set(keys::SEEN_CONTENT_BLOCKER, PrefValue::Bool(value))
    }

    pub fn did_ask_to_enable_notifications(&self) -> Result<bool, PrefsError> {
        Ok(self
            .store
            .get_bool(keys::DID_ASK_TO_ENABLE_NOTIFICATIONS)?
            .or(false))
    }

    pub fn set_did_ask_to_enable_notifications(&self, value: bool) -> Result<(), PrefsError> {
        self.store
            .set(keys::DID_ASK_TO_ENABLE_NOTIFICATIONS, PrefValue::Bool(value))
    }

    /// Unknown codes read as the default theme.
    pub fn current_theme_code(&self) -> Result<ThemeCode, PrefsError> {
        Ok(self
            .store
            .get_int(keys::THEME)?
            .and_then(ThemeCode::from_repr)
            .or(Self::DEFAULT_THEME))
    }

    pub fn set_current_theme_code(&self, code: ThemeCode) -> Result<(), PrefsError> {
        self.store.set(keys::THEME, PrefValue::Int(code as i64))
    }

    /// Unknown raw values read as disconnected.
    pub fn last_vpn_connection_status(&self) -> Result<VpnStatus, PrefsError> {
        Ok(self
            .store
            .get_string(keys::LAST_VPN_CONNECTION_STATUS)?
            .and_then(|raw| raw.parse().ok())
            .or(Self::DEFAULT_STATUS))
    }

    pub fn set_last_vpn_connection_status(&self, status: VpnStatus) -> Result<(), PrefsError> {
        self.store.set(
            keys::LAST_VPN_CONNECTION_STATUS,
            PrefValue::from(status.as_ref()),
        )
    }

    pub fn snapshot(&self) -> Result<Snapshot, PrefsError> {
        Ok(Snapshot {
            version: self.version_marker()?,
            logged_username: self
                .logged_username()?
                .map(|account| account.as_str().to_owned()),
            was_launched: self.was_launched()?,
            did_see_content_blocker: self.did_see_content_blocker()?,
            did_ask_to_enable_notifications: self.did_ask_to_enable_notifications()?,
            theme: self.current_theme_code()?,
            last_vpn_connection_status: self.last_vpn_connection_status()?,
        })
    }
}

/// Every canonical preference, read at one point in time.
#[derive(Serialize, Debug, PartialEq)]
pub struct Snapshot {
    pub version: Lookup<String>,
    pub logged_username: Lookup<String>,
    pub was_launched: bool,
    pub did_see_content_blocker: bool,
    pub did_ask_to_enable_notifications: bool,
    pub theme: ThemeCode,
    pub last_vpn_connection_status: VpnStatus,
}
