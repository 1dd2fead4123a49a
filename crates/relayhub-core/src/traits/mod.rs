//! Seams for the external collaborators the hub consumes but does not own.

pub mod auth;

pub use auth::{CredentialStore, TokenIssuer, TokenVerifier};
