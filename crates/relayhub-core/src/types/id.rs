//! Newtype wrapper around [`uuid::Uuid`] for connection handles.
//!
//! Using a distinct type prevents accidentally passing some other UUID
//! where a connection handle is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique handle of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
