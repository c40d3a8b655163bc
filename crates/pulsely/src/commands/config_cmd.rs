//! Configuration inspection and setup.

use std::io::IsTerminal;

use dialoguer::Input;

use pulsely_config::{Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Init => init(global),
        ConfigCommand::Path => {
            let path = pulsely_config::config_path().ok_or(ConfigError::NoConfigDir)?;
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load_config(global)?;
    let rendered = toml::to_string_pretty(&config).map_err(ConfigError::Serialize)?;

    let session_stored = matches!(pulsely_config::resolve_refresh_token(), Ok(Some(_)));
    let mut out = rendered;
    out.push_str(&format!("\n# stored session: {session_stored}"));
    if let Some(path) = pulsely_config::config_path() {
        out.push_str(&format!("\n# file: {}", path.display()));
    }

    output::print_output(&out, global.quiet);
    Ok(())
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let current = util::load_config(global)?;

    // Interactive only on a real terminal; otherwise write the resolved
    // configuration as-is so scripted setups stay non-blocking.
    let config = if std::io::stdin().is_terminal() {
        prompt(current)?
    } else {
        current
    };

    let path = pulsely_config::save_config(&config)?;
    output::print_output(&format!("Wrote {}.", path.display()), global.quiet);
    Ok(())
}

fn prompt(current: Config) -> Result<Config, CliError> {
    let mut config = current;

    config.api.base_url = Input::new()
        .with_prompt("API base URL")
        .default(config.api.base_url)
        .interact_text()
        .map_err(|e| CliError::Validation {
            field: "api.base_url".into(),
            reason: e.to_string(),
        })?;

    config.auth.domain = Input::new()
        .with_prompt("Identity provider domain (e.g. pulsely.eu.auth0.com)")
        .default(config.auth.domain)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::Validation {
            field: "auth.domain".into(),
            reason: e.to_string(),
        })?;

    config.auth.client_id = Input::new()
        .with_prompt("Identity provider client id")
        .default(config.auth.client_id)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::Validation {
            field: "auth.client_id".into(),
            reason: e.to_string(),
        })?;

    config.auth.audience = Input::new()
        .with_prompt("API audience")
        .default(config.auth.audience)
        .interact_text()
        .map_err(|e| CliError::Validation {
            field: "auth.audience".into(),
            reason: e.to_string(),
        })?;

    Ok(config)
}
