use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

const ENV_PREFIX: &str = "PREFS_MIGRATE_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub app: String,
    pub deps: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const APP_LEVEL: &str = "info";
    const DEPS_LEVEL: &str = "warn";

    fn ensure_valid(&mut self) {
        self.app = Self::valid_level("app", &self.app, Self::APP_LEVEL);
        self.deps = Self::valid_level("deps", &self.deps, Self::DEPS_LEVEL);
    }

    fn valid_level(name: &str, value: &str, default: &str) -> String {
        let level = value.trim().to_ascii_lowercase();
        if Self::LOG_LEVELS.contains(&level.as_str()) {
            level
        } else {
            eprintln!(
                "Config error: {} log level of '{}' is invalid - using default of '{}'",
                name, value, default
            );
            default.to_owned()
        }
    }

    /// `flexi_logger` spec: dependency level first, then this crate's level.
    pub fn spec(&self) -> String {
        format!("{}, {}={}", self.deps, env!("CARGO_CRATE_NAME"), self.app)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            app: Self::APP_LEVEL.to_owned(),
            deps: Self::DEPS_LEVEL.to_owned(),
        }
    }
}

/// Where credentials are kept.
#[derive(
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CredentialBackend {
    /// The OS keyring, one service per scope.
    #[default]
    Keyring,
    /// The `credentials` table next to the preferences. Unencrypted; for
    /// hosts without a usable keyring.
    Sqlite,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_db: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_db: Option<PathBuf>,
    #[serde(default)]
    pub credential_backend: CredentialBackend,
}

/// Order of the legacy removals and shared writes when a credential is relocated.
#[derive(
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RelocationOrder {
    /// Legacy keys and secret are removed before the shared writes. A crash
    /// between the two loses the credential.
    #[default]
    DeleteThenWrite,
    /// Shared writes first; legacy state is removed only once both succeed.
    WriteThenDelete,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub current_version: String,
    pub team_id: String,
    pub app_group: String,
    #[serde(default)]
    pub relocation_order: RelocationOrder,
}

impl AppConfig {
    const CURRENT_VERSION: &str = "3.0";
    const TEAM_ID: &str = "local";
    const APP_GROUP: &str = "group.prefs-migrate";

    fn ensure_valid(&mut self) {
        if self.current_version.trim().is_empty() {
            eprintln!(
                "Config error: current_version is empty - using default of '{}'",
                Self::CURRENT_VERSION
            );
            self.current_version = Self::CURRENT_VERSION.to_owned();
        }
        if self.app_group.trim().is_empty() {
            eprintln!(
                "Config error: app_group is empty - using default of '{}'",
                Self::APP_GROUP
            );
            self.app_group = Self::APP_GROUP.to_owned();
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            current_version: Self::CURRENT_VERSION.to_owned(),
            team_id: Self::TEAM_ID.to_owned(),
            app_group: Self::APP_GROUP.to_owned(),
            relocation_order: RelocationOrder::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub app: AppConfig,
}

impl Config {
    /// Loads `config.toml` from the app's local data directory, writing a
    /// default file first if none exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");
        let mut config = Self::load_from(&config_path);
        if config.storage.data_dir.is_none() {
            config.storage.data_dir = Some(project_dirs.data_local_dir().to_path_buf());
        }
        config
    }

    /// Defaults, merged with the TOML file at `config_path`, merged with
    /// `PREFS_MIGRATE_`-prefixed environment variables (`__` separates
    /// sections). On any extraction error the defaults are used.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        if !config_path.exists() {
            Self::write_default(config_path, &default_config);
        }

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn write_default(config_path: &Path, default_config: &Config) {
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "Failed to create configuration directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        match toml::to_string_pretty(default_config) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            }
            Err(_) => eprintln!("Failed to serialize default config."),
        }
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.app.ensure_valid();
    }

    fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn legacy_db_path(&self) -> PathBuf {
        self.storage
            .legacy_db
            .clone()
            .unwrap_or_else(|| self.data_dir().join("legacy").join("preferences.db"))
    }

    pub fn shared_db_path(&self) -> PathBuf {
        self.storage.shared_db.clone().unwrap_or_else(|| {
            self.data_dir()
                .join("groups")
                .join(&self.app.app_group)
                .join("preferences.db")
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}
