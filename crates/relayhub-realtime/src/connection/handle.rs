//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use relayhub_core::types::{ConnectionId, Identity};

use super::transport::ServerFrame;

/// Lifecycle of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Registered and exchanging frames
    Active = 0,
    /// Teardown requested; no further sends accepted
    Closing = 1,
    /// Removed from the registry
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Active,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Why a frame could not be queued for a connection.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection is closing or its writer is gone.
    #[error("connection is closed")]
    Closed,
    /// The outbound queue is full.
    #[error("outbound queue is full")]
    Backpressure,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded sender feeding the connection's writer task, plus the
/// identity it was authenticated as. Cancelling `shutdown` stops every task
/// that belongs to the connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Identity the token resolved to
    pub identity: Identity,
    sender: mpsc::Sender<ServerFrame>,
    state: AtomicU8,
    shutdown: CancellationToken,
    opened: Instant,
    last_activity_ms: AtomicU64,
    last_pong_ms: AtomicU64,
}

impl ConnectionHandle {
    /// Create a new, active connection handle
    pub fn new(
        identity: Identity,
        sender: mpsc::Sender<ServerFrame>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            identity,
            sender,
            state: AtomicU8::new(ConnectionState::Active as u8),
            shutdown,
            opened: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            last_pong_ms: AtomicU64::new(0),
        }
    }

    /// Queue a frame without waiting. Fails if the connection is no longer
    /// active or its queue is full.
    pub fn send(&self, frame: ServerFrame) -> Result<(), DeliveryError> {
        if !self.is_active() {
            return Err(DeliveryError::Closed);
        }
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Check if the connection is active
    pub fn is_active(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    /// Request teardown: moves Active to Closing and cancels the
    /// connection's tasks. Returns `true` for the call that made the move.
    pub fn close(&self) -> bool {
        let initiated = self
            .state
            .compare_exchange(
                ConnectionState::Active as u8,
                ConnectionState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        self.shutdown.cancel();
        initiated
    }

    /// Moves Closing to Closed. Exactly one caller gets `true`; that caller
    /// owns the registry removal.
    pub fn finish(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Closing as u8,
                ConnectionState::Closed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Resolves once teardown has been requested.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Update last activity timestamp
    pub fn touch(&self) {
        self.last_activity_ms
            .store(self.elapsed_ms(), Ordering::Relaxed);
    }

    /// Record a pong response
    pub fn record_pong(&self) {
        let now = self.elapsed_ms();
        self.last_pong_ms.store(now, Ordering::Relaxed);
        self.last_activity_ms.store(now, Ordering::Relaxed);
    }

    /// Time since the last inbound frame (or since open)
    pub fn idle_for(&self) -> Duration {
        self.since(self.last_activity_ms.load(Ordering::Relaxed))
    }

    /// Time since the last pong (or since open)
    pub fn since_last_pong(&self) -> Duration {
        self.since(self.last_pong_ms.load(Ordering::Relaxed))
    }

    fn elapsed_ms(&self) -> u64 {
        self.opened.elapsed().as_millis() as u64
    }

    fn since(&self, mark_ms: u64) -> Duration {
        Duration::from_millis(self.elapsed_ms().saturating_sub(mark_ms))
    }
}

/// Convenience constructor used by tests across the crate.
#[cfg(test)]
pub(crate) fn test_handle(
    name: &str,
    capacity: usize,
) -> (std::sync::Arc<ConnectionHandle>, mpsc::Receiver<ServerFrame>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = ConnectionHandle::new(Identity::from(name), tx, CancellationToken::new());
    (std::sync::Arc::new(handle), rx)
}
