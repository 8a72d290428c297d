mod app_prefs;
mod cli;
mod config;
mod context;
mod database;
mod error;
mod keys;
mod logging;
mod lookup;
mod migration;
mod prefs;
mod schema;
mod scope;
mod secrets;

use cli::Cli;
use log::error;

fn main() {
    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
