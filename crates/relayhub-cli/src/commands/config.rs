//! Configuration inspection commands.

use clap::{Args, Subcommand};

use relayhub_core::config::AppConfig;
use relayhub_core::error::AppError;

use super::Cli;
use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with secrets masked
    Show,
    /// Load the configuration and check the credential list
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli, format: OutputFormat) -> Result<(), AppError> {
    let config = cli.load_config()?;
    match &args.command {
        ConfigCommand::Show => {
            let value = serde_json::to_value(masked(config))?;
            output::print_value(&value, format);
        }
        ConfigCommand::Validate => {
            relayhub_auth::ConfigCredentialStore::new(&config.auth.users)?;
            output::print_success(&format!(
                "Configuration '{}/{}' is valid",
                cli.config_dir, cli.env
            ));
            println!("  Server: {}", config.server.bind_address());
            println!("  Users: {}", config.auth.users.len());
            println!("  Log level: {}", config.logging.level);
        }
    }
    Ok(())
}

fn masked(mut config: AppConfig) -> AppConfig {
    config.auth.jwt_secret = "********".to_string();
    for user in &mut config.auth.users {
        user.password_hash = "********".to_string();
    }
    config
}
