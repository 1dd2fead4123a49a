//! JWT token creation with configurable TTL.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use relayhub_core::Identity;
use relayhub_core::config::AuthConfig;
use relayhub_core::error::AppError;
use relayhub_core::traits::TokenIssuer;

use super::claims::Claims;

/// Creates signed HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in seconds.
    ttl_seconds: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_seconds: i64::try_from(config.token_ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Builds the claims for a fresh token.
    fn claims_for(&self, identity: &Identity) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: identity.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
            jti: Uuid::new_v4(),
        }
    }
}

impl TokenIssuer for JwtEncoder {
    fn mint(&self, identity: &Identity) -> Result<String, AppError> {
        let claims = self.claims_for(identity);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
