//! Session registry: identity -> live connections, with presence
//! transitions computed atomically per identity.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use relayhub_core::types::{ConnectionId, Identity};

use super::handle::ConnectionHandle;

/// Effect of a registry change on an identity's presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// Connection count went 0 -> 1
    Joined,
    /// Connection count went 1 -> 0
    Left,
    /// Identity was, and still is, online
    Unchanged,
}

/// All registered connections, grouped by identity.
///
/// Register and unregister for one identity run under that identity's
/// shard lock, so concurrent joins and leaves of the same identity observe
/// each other and each 0 <-> 1 edge is reported exactly once.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_identity: DashMap<Identity, HashMap<ConnectionId, Arc<ConnectionHandle>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection under its identity.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> PresenceTransition {
        let mut connections = self.by_identity.entry(handle.identity.clone()).or_default();
        let id = handle.id;
        if connections.insert(id, handle).is_some() {
            return PresenceTransition::Unchanged;
        }
        if connections.len() == 1 {
            PresenceTransition::Joined
        } else {
            PresenceTransition::Unchanged
        }
    }

    /// Remove a connection. Returns `None` if it was not registered, which
    /// makes repeated teardown a no-op.
    pub fn unregister(&self, handle: &ConnectionHandle) -> Option<PresenceTransition> {
        match self.by_identity.entry(handle.identity.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remove(&handle.id)?;
                if entry.get().is_empty() {
                    entry.remove();
                    Some(PresenceTransition::Left)
                } else {
                    Some(PresenceTransition::Unchanged)
                }
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Identities with at least one connection, in sorted order.
    pub fn online_identities(&self) -> BTreeSet<Identity> {
        self.by_identity.iter().map(|e| e.key().clone()).collect()
    }

    /// Every registered connection at this instant.
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_identity
            .iter()
            .flat_map(|e| e.value().values().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Whether an identity has at least one connection
    pub fn is_online(&self, identity: &Identity) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// Total registered connections
    pub fn connection_count(&self) -> usize {
        self.by_identity.iter().map(|e| e.value().len()).sum()
    }

    /// Number of online identities
    pub fn identity_count(&self) -> usize {
        self.by_identity.len()
    }
}
