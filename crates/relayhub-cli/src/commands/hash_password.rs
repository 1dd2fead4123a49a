//! Produce an Argon2id hash for the credentials config.

use clap::Args;
use serde_json::json;

use relayhub_auth::PasswordHasher;
use relayhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the hash-password command
#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Plaintext password to hash
    pub password: String,
}

/// Execute the hash-password command
pub async fn execute(args: &HashPasswordArgs, format: OutputFormat) -> Result<(), AppError> {
    let password = args.password.clone();
    let hash = tokio::task::spawn_blocking(move || PasswordHasher::new().hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))??;

    match format {
        OutputFormat::Text => println!("{hash}"),
        OutputFormat::Json => output::print_value(&json!({ "password_hash": hash }), format),
    }
    Ok(())
}
