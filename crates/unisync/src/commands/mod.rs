//! Command dispatch: bridges CLI args -> config + engine -> output formatting.

pub mod config_cmd;
pub mod controllers;
pub mod sync;

use clap::CommandFactory;

use unisync_config::Config;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Sync(args) => sync::sync(args.dry_run, global).await,
        Command::Plan => sync::sync(true, global).await,
        Command::Run(args) => sync::run(args, global).await,
        Command::Controllers => controllers::handle(global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "unisync", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file named by `--config` (or the default location).
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(unisync_config::load_config(global.config.as_deref())?)
}
