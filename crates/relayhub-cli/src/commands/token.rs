//! Mint a bearer token offline.

use clap::Args;
use serde_json::json;

use relayhub_auth::JwtEncoder;
use relayhub_core::config::AppConfig;
use relayhub_core::error::AppError;
use relayhub_core::traits::TokenIssuer;
use relayhub_core::types::Identity;

use crate::output::{self, OutputFormat};

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Identity the token is issued for
    pub username: String,
}

/// Execute the token command
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let username = args.username.trim();
    if username.is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }

    let token = JwtEncoder::new(&config.auth).mint(&Identity::from(username))?;

    match format {
        OutputFormat::Text => println!("{token}"),
        OutputFormat::Json => output::print_value(
            &json!({ "token": token, "expires_in": config.auth.token_ttl_seconds }),
            format,
        ),
    }
    Ok(())
}
