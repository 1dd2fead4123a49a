//! Shared domain types.

pub mod id;
pub mod identity;

pub use id::ConnectionId;
pub use identity::Identity;
