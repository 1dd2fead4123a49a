//! Credential and token collaborator traits.
//!
//! The realtime core only ever calls [`TokenVerifier::verify`] at handshake
//! time. The login boundary uses [`CredentialStore`] and [`TokenIssuer`].

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Identity;

/// Verifies a username/password pair.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the identity on success, an
    /// [`ErrorKind::InvalidCredentials`](crate::error::ErrorKind::InvalidCredentials)
    /// error otherwise.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Identity>;
}

/// Mints bearer tokens for authenticated identities.
pub trait TokenIssuer: Send + Sync + 'static {
    /// Issue a signed token for `identity`.
    fn mint(&self, identity: &Identity) -> AppResult<String>;
}

/// Validates bearer tokens presented on the upgrade request.
pub trait TokenVerifier: Send + Sync + 'static {
    /// Returns the identity the token was minted for, or an
    /// [`ErrorKind::Authentication`](crate::error::ErrorKind::Authentication)
    /// error for missing, malformed, expired, or forged tokens.
    fn verify(&self, token: &str) -> AppResult<Identity>;
}
