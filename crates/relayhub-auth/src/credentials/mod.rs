//! Credential stores.

pub mod store;

pub use store::ConfigCredentialStore;
