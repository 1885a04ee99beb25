//! `config` subcommand handlers.

use std::io::{self, BufRead};

use unisync_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "<redacted>";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(global)?;
            let rendered = toml::to_string_pretty(&redacted(config))?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(unisync_config::config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetKey { controller } => {
            let config = super::load_config(global)?;
            if !config.controllers.iter().any(|c| c.id() == controller) {
                let known: Vec<&str> = config.controllers.iter().map(|c| c.id()).collect();
                return Err(CliError::Validation {
                    field: "controller".into(),
                    reason: format!(
                        "'{controller}' is not configured (known: {})",
                        known.join(", ")
                    ),
                });
            }

            let mut key = String::new();
            io::stdin().lock().read_line(&mut key)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "no key on stdin".into(),
                });
            }

            unisync_config::store_api_key(&controller, key)?;
            eprintln!("Stored API key for '{controller}' in the system keyring.");
            Ok(())
        }
    }
}

fn redacted(mut config: Config) -> Config {
    for entry in &mut config.controllers {
        if entry.api_key.is_some() {
            entry.api_key = Some(REDACTED.into());
        }
    }
    config
}
