//! Preference key names, shared by the legacy and the shared scope.

/// Schema version marker, shared scope only.
pub const VERSION: &str = "Version";

// Canonical keys (shared scope)
pub const LOGGED_USERNAME: &str = "LoggedUsername";
pub const LAUNCHED: &str = "Launched";
pub const SEEN_CONTENT_BLOCKER: &str = "SeenContentBlocker";
pub const DID_ASK_TO_ENABLE_NOTIFICATIONS: &str = "DidAskToEnableNotifications";
pub const THEME: &str = "Theme";
pub const LAST_VPN_CONNECTION_STATUS: &str = "LastVPNConnectionStatus";

/// Legacy keys (single-app scope)
pub mod legacy {
    /// Account key used before the rename to `LoggedUsername`.
    pub const USERNAME: &str = "Username";
    pub const LOGGED_USERNAME: &str = "LoggedUsername";
    /// Inverse of the canonical `Launched` flag.
    pub const FIRST_LAUNCH: &str = "FirstLaunch";
    pub const DID_ASK_TO_ENABLE_NOTIFICATIONS: &str = "DidAskToEnableNotifications";

    pub const SUBSCRIPTION_EXPIRATION_DATE: &str = "SubscriptionExpirationDate";
    pub const SUBSCRIPTION_PLAN: &str = "SubscriptionPlan";

    /// Subscription cache, refetched from the server after login.
    pub const DEPRECATED: [&str; 2] = [SUBSCRIPTION_EXPIRATION_DATE, SUBSCRIPTION_PLAN];

    pub const ACCOUNT_KEYS: [&str; 2] = [USERNAME, LOGGED_USERNAME];
}
