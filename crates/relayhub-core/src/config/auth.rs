//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Known accounts.
    #[serde(default)]
    pub users: Vec<UserCredential>,
}

/// One account entry in the config-backed credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    /// Login name, also used as the identity on the wire.
    pub username: String,
    /// Argon2id PHC string (`relayhub-cli hash-password` produces one).
    pub password_hash: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_seconds: default_token_ttl(),
            leeway_seconds: default_leeway(),
            users: Vec::new(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    1800
}

fn default_leeway() -> u64 {
    5
}
