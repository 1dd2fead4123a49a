//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections ever registered
    pub connections_total: AtomicU64,
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Handshakes rejected for a missing or invalid token
    pub handshakes_rejected: AtomicU64,
    /// Inbound frames accepted for dispatch
    pub messages_received: AtomicU64,
    /// Inbound frames dropped as oversized or malformed
    pub frames_dropped: AtomicU64,
    /// Inbound messages denied by the per-identity limits
    pub messages_rate_limited: AtomicU64,
    /// Events published to the hub
    pub events_published: AtomicU64,
    /// Successful per-recipient enqueues
    pub deliveries: AtomicU64,
    /// Recipients evicted after a failed enqueue
    pub evictions: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registered connection
    pub fn record_connect(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a torn-down connection
    pub fn record_disconnect(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a rejected handshake
    pub fn record_handshake_rejected(&self) {
        self.handshakes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted inbound message
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped inbound frame
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rate-limited inbound message
    pub fn record_rate_limited(&self) {
        self.messages_rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one publish and its outcome
    pub fn record_publish(&self, delivered: usize, evicted: usize) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            handshakes_rejected: self.handshakes_rejected.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            messages_rate_limited: self.messages_rate_limited.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_total: u64,
    /// Connections currently registered
    pub connections_active: u64,
    /// Rejected handshakes
    pub handshakes_rejected: u64,
    /// Accepted inbound messages
    pub messages_received: u64,
    /// Dropped inbound frames
    pub frames_dropped: u64,
    /// Rate-limited inbound messages
    pub messages_rate_limited: u64,
    /// Published events
    pub events_published: u64,
    /// Successful deliveries
    pub deliveries: u64,
    /// Evicted recipients
    pub evictions: u64,
}
