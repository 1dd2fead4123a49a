//! # relayhub-auth
//!
//! Concrete implementations of the login-side collaborators:
//!
//! - [`JwtEncoder`] / [`JwtDecoder`]: HS256 bearer tokens
//!   ([`TokenIssuer`](relayhub_core::traits::TokenIssuer) and
//!   [`TokenVerifier`](relayhub_core::traits::TokenVerifier))
//! - [`PasswordHasher`]: Argon2id hashing
//! - [`ConfigCredentialStore`]: accounts seeded from configuration

pub mod credentials;
pub mod jwt;
pub mod password;

pub use credentials::ConfigCredentialStore;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
