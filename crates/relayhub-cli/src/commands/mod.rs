//! CLI command definitions and dispatch.

pub mod config;
pub mod hash_password;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use relayhub_core::config::AppConfig;
use relayhub_core::error::AppError;

use crate::output::OutputFormat;

/// RelayHub: real-time presence and message relay
#[derive(Debug, Parser)]
#[command(name = "relayhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load (`<config_dir>/<env>.toml`)
    #[arg(short, long, env = "RELAYHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the RelayHub server
    Serve(serve::ServeArgs),
    /// Hash a password for the `auth.users` config list
    HashPassword(hash_password::HashPasswordArgs),
    /// Mint a bearer token for a username with the configured secret
    Token(token::TokenArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self.load_config()?).await,
            Commands::HashPassword(args) => hash_password::execute(args, self.format).await,
            Commands::Token(args) => token::execute(args, &self.load_config()?, self.format),
            Commands::Config(args) => config::execute(args, self, self.format),
        }
    }

    /// Load the layered configuration selected by the global flags
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config_dir, &self.env)
    }
}
