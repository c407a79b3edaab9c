//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::AppmakeResult;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> AppmakeResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
    }

    Ok(())
}

fn show_config(config: &Config) -> AppmakeResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    let suffix = if manager.path().exists() {
        ""
    } else {
        " (not found, using defaults)"
    };
    println!("{}{}", manager.path().display(), suffix);
}
