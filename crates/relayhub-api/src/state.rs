//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use relayhub_auth::{ConfigCredentialStore, JwtDecoder, JwtEncoder};
use relayhub_core::AppResult;
use relayhub_core::config::{AppConfig, AuthConfig};
use relayhub_core::traits::{CredentialStore, TokenIssuer, TokenVerifier};
use relayhub_realtime::{RateLimiter, RealtimeEngine};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket hub
    pub realtime: RealtimeEngine,
    /// Username/password check for `/login`
    pub credentials: Arc<dyn CredentialStore>,
    /// Token minting for `/login`
    pub token_issuer: Arc<dyn TokenIssuer>,
    /// Per-address login attempts
    pub login_limiter: Arc<RateLimiter<String>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .field("login_limiter", &self.login_limiter)
            .finish()
    }
}

impl AppState {
    /// Assemble state from explicit collaborators.
    pub fn new(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        token_issuer: Arc<dyn TokenIssuer>,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            &config.rate_limit,
            token_verifier,
        );
        let login_limiter = Arc::new(RateLimiter::new(config.rate_limit.login));

        Self {
            config: Arc::new(config),
            realtime,
            credentials,
            token_issuer,
            login_limiter,
        }
    }

    /// Assemble state with the configured users and HS256 tokens.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let credentials = ConfigCredentialStore::new(&config.auth.users)?;
        if credentials.is_empty() {
            tracing::warn!("No users configured; every login will be rejected");
        }
        if config.auth.jwt_secret == AuthConfig::default().jwt_secret {
            tracing::warn!("Using the default JWT secret; set auth.jwt_secret before deploying");
        }

        let encoder = JwtEncoder::new(&config.auth);
        let decoder = JwtDecoder::new(&config.auth);

        Ok(Self::new(
            config,
            Arc::new(credentials),
            Arc::new(encoder),
            Arc::new(decoder),
        ))
    }
}
