//! RelayHub Server: real-time presence and message relay.
//!
//! Main entry point that loads configuration, sets up logging, and starts
//! the server.

use tracing_subscriber::{EnvFilter, fmt};

use relayhub_core::config::AppConfig;
use relayhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `RELAYHUB_CONFIG_DIR` (default `config`), the
/// `RELAYHUB_ENV` overlay, and `RELAYHUB__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_dir = std::env::var("RELAYHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("RELAYHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&config_dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RelayHub v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        users = config.auth.users.len(),
        ping_interval_seconds = config.realtime.ping_interval_seconds,
        "Configuration loaded"
    );
    relayhub_api::run_server(config).await
}
