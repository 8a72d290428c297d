use clap::{ArgAction, Parser, Subcommand};
use directories::ProjectDirs;
use log::info;
use std::path::PathBuf;

use crate::app_prefs::{AppPreferences, ThemeCode, VpnStatus};
use crate::config::Config;
use crate::context::StoreContext;
use crate::error::PrefsError;
use crate::logging;
use crate::lookup::Lookup;
use crate::migration::VersionGate;

#[derive(Parser)]
#[command(
    name = "prefs-migrate",
    version,
    about = "Migrates app preferences and the signed-in credential to the shared scope"
)]
pub struct Cli {
    /// Directory holding config, databases and logs (default: platform data dir)
    #[arg(long = "data-dir", short = 'd', global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the startup migration (default if no command specified)
    Migrate,

    /// Show the canonical preferences in the shared scope
    Status {
        /// Print as JSON
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },

    /// Write one canonical preference in the shared scope
    Set {
        #[command(subcommand)]
        setting: Setting,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    /// Whether the app has completed its first launch
    Launched {
        #[arg(action = ArgAction::Set)]
        value: bool,
    },

    /// Whether the content blocker introduction was shown
    SeenContentBlocker {
        #[arg(action = ArgAction::Set)]
        value: bool,
    },

    /// Whether the user was asked to enable notifications
    AskedNotifications {
        #[arg(action = ArgAction::Set)]
        value: bool,
    },

    /// Color theme (light, dark)
    Theme { theme: ThemeCode },

    /// Last VPN connection status (connected, connecting, disconnected, disconnecting)
    VpnStatus { status: VpnStatus },
}

impl Cli {
    pub fn handle_command_line() -> Result<(), PrefsError> {
        let args = Cli::parse();
        let config = Self::load_config(args.data_dir.as_deref())?;

        // Keep the handle alive until exit so buffered log lines are flushed
        let _logger = logging::init(&config)?;

        let ctx = StoreContext::open(&config)?;

        match args.command.unwrap_or(Command::Migrate) {
            Command::Migrate => Self::migrate(&config, &ctx),
            Command::Status { json } => Self::status(&ctx, json),
            Command::Set { setting } => Self::set(&ctx, setting),
        }
    }

    fn load_config(data_dir: Option<&std::path::Path>) -> Result<Config, PrefsError> {
        match data_dir {
            Some(dir) => {
                let mut config = Config::load_from(&dir.join("config.toml"));
                config.storage.data_dir = Some(dir.to_path_buf());
                Ok(config)
            }
            None => {
                let project_dirs = ProjectDirs::from("", "", "prefs-migrate").ok_or_else(|| {
                    PrefsError::Error("Could not determine project directories".to_string())
                })?;
                Ok(Config::load_config(&project_dirs))
            }
        }
    }

    fn migrate(config: &Config, ctx: &StoreContext) -> Result<(), PrefsError> {
        let outcome = VersionGate::from_config(&config.app).run_startup_migration(ctx)?;
        info!("Startup migration finished: {}", outcome);
        println!("{}", outcome);
        Ok(())
    }

    fn set(ctx: &StoreContext, setting: Setting) -> Result<(), PrefsError> {
        let prefs = AppPreferences::new(ctx.shared_prefs());

        match setting {
            Setting::Launched { value } => prefs.set_was_launched(value)?,
            Setting::SeenContentBlocker { value } => prefs.set_did_see_content_blocker(value)?,
            Setting::AskedNotifications { value } => {
                prefs.set_did_ask_to_enable_notifications(value)?
            }
            Setting::Theme { theme } => prefs.set_current_theme_code(theme)?,
            Setting::VpnStatus { status } => prefs.set_last_vpn_connection_status(status)?,
        }

        info!("Updated shared preference: {:?}", setting);
        Ok(())
    }

    fn status(ctx: &StoreContext, json: bool) -> Result<(), PrefsError> {
        let snapshot = AppPreferences::new(ctx.shared_prefs()).snapshot()?;

        if json {
            let out = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| PrefsError::Error(format!("Failed to serialize status: {}", e)))?;
            println!("{}", out);
            return Ok(());
        }

        let show = |value: &Lookup<String>| match value {
            Lookup::Present(v) => v.clone(),
            Lookup::Absent => "-".to_string(),
        };
        println!("Version:                        {}", show(&snapshot.version));
        println!("Logged username:                {}", show(&snapshot.logged_username));
        println!("Launched:                       {}", snapshot.was_launched);
        println!("Seen content blocker:           {}", snapshot.did_see_content_blocker);
        println!(
            "Asked to enable notifications:  {}",
            snapshot.did_ask_to_enable_notifications
        );
        println!("Theme:                          {}", snapshot.theme);
        println!(
            "Last VPN connection status:     {}",
            snapshot.last_vpn_connection_status
        );
        Ok(())
    }
}
