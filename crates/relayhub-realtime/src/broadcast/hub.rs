//! Broadcast hub: serialize once, enqueue to every recipient, evict the
//! ones that cannot keep up.

use std::sync::{Arc, Mutex, MutexGuard};

use relayhub_core::types::ConnectionId;

use crate::connection::handle::{ConnectionHandle, DeliveryError};
use crate::connection::registry::{PresenceTransition, SessionRegistry};
use crate::connection::transport::ServerFrame;
use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// Held while a presence transition is decided and announced.
type PresenceOrder<'a> = MutexGuard<'a, ()>;

/// Publishes server events to registered connections.
///
/// Publishing never waits on a recipient: each enqueue is a `try_send` on
/// the recipient's bounded queue. A recipient whose queue is full or closed
/// is evicted after the pass, and one recipient's failure never affects
/// delivery to the others.
///
/// Registry changes go through [`join`](Self::join), [`leave`](Self::leave)
/// and evictions. Each holds the presence lock from the registry change
/// until its announcement is enqueued everywhere, so every recipient sees
/// `user_joined`/`user_left` in the order the registry changed.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    registry: Arc<SessionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    presence: Arc<Mutex<()>>,
}

impl BroadcastHub {
    /// Create a hub over a registry
    pub fn new(registry: Arc<SessionRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            registry,
            metrics,
            presence: Arc::new(Mutex::new(())),
        }
    }

    /// Send `event` to every active connection except `exclude`. Returns
    /// the number of successful enqueues.
    pub fn publish(&self, event: &ServerEvent, exclude: Option<ConnectionId>) -> usize {
        let (delivered, failed) = self.fan_out(event, exclude);
        if !failed.is_empty() {
            let order = self.presence_order();
            for conn in failed {
                self.evict_locked(&order, &conn);
            }
        }
        delivered
    }

    /// Register a connection, send it the online list, and announce its
    /// identity to everyone else if this is the identity's first connection.
    pub fn join(&self, conn: &Arc<ConnectionHandle>) -> PresenceTransition {
        let order = self.presence_order();
        let transition = self.registry.register(Arc::clone(conn));

        let users = self.registry.online_identities().into_iter().collect();
        if let Err(e) = self.send_to(conn, &ServerEvent::OnlineList { users }) {
            tracing::debug!(conn_id = %conn.id, "Failed to send online list: {}", e);
            conn.close();
        }

        if transition == PresenceTransition::Joined {
            tracing::info!(identity = %conn.identity, "User joined");
            let event = ServerEvent::UserJoined {
                user: conn.identity.clone(),
            };
            let (_, failed) = self.fan_out(&event, Some(conn.id));
            for failed_conn in failed {
                self.evict_locked(&order, &failed_conn);
            }
        }
        transition
    }

    /// Unregister a connection, announcing the identity's departure if it
    /// was the last connection. Returns `None` if it was already gone.
    pub fn leave(&self, conn: &ConnectionHandle) -> Option<PresenceTransition> {
        let order = self.presence_order();
        let transition = self.registry.unregister(conn);
        if transition == Some(PresenceTransition::Left) {
            tracing::info!(identity = %conn.identity, "User left");
            self.announce_left(&order, conn);
        }
        transition
    }

    /// Send `event` to one connection.
    pub fn send_to(&self, conn: &ConnectionHandle, event: &ServerEvent) -> Result<(), DeliveryError> {
        let payload = encode(event).ok_or(DeliveryError::Closed)?;
        conn.send(ServerFrame::Text(payload))
    }

    fn presence_order(&self) -> PresenceOrder<'_> {
        self.presence.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Close a connection and remove it from the registry. Its own teardown
    /// later finds it already gone.
    fn evict_locked(&self, order: &PresenceOrder<'_>, conn: &ConnectionHandle) {
        conn.close();
        if self.registry.unregister(conn) == Some(PresenceTransition::Left) {
            tracing::info!(identity = %conn.identity, "User left (evicted)");
            self.announce_left(order, conn);
        }
    }

    fn announce_left(&self, order: &PresenceOrder<'_>, conn: &ConnectionHandle) {
        let event = ServerEvent::UserLeft {
            user: conn.identity.clone(),
        };
        let (_, failed) = self.fan_out(&event, None);
        for failed_conn in failed {
            self.evict_locked(order, &failed_conn);
        }
    }

    /// Enqueue to every active connection except `exclude`. Returns the
    /// delivery count and the recipients that failed.
    fn fan_out(
        &self,
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> (usize, Vec<Arc<ConnectionHandle>>) {
        let Some(payload) = encode(event) else {
            return (0, Vec::new());
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for conn in self.registry.snapshot() {
            if Some(conn.id) == exclude || !conn.is_active() {
                continue;
            }
            match conn.send(ServerFrame::Text(Arc::clone(&payload))) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        conn_id = %conn.id,
                        identity = %conn.identity,
                        event = event.event_type(),
                        "Delivery failed ({}), evicting connection",
                        e
                    );
                    failed.push(conn);
                }
            }
        }

        self.metrics.record_publish(delivered, failed.len());
        tracing::trace!(
            event = event.event_type(),
            delivered,
            failed = failed.len(),
            "Published event"
        );
        (delivered, failed)
    }
}

fn encode(event: &ServerEvent) -> Option<Arc<str>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::error!(event = event.event_type(), "Failed to serialize event: {}", e);
            None
        }
    }
}
