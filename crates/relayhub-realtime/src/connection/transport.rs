//! Transport-neutral frame types.
//!
//! The HTTP layer maps its WebSocket messages into these so the supervisor
//! can run over any stream/sink pair.

use std::sync::Arc;

/// A frame received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// UTF-8 text frame
    Text(String),
    /// Binary frame; not part of the protocol
    Binary(Vec<u8>),
    /// Client ping (the transport answers it)
    Ping,
    /// Reply to a server ping
    Pong,
    /// Close handshake
    Close,
}

/// A frame queued for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Serialized event. Shared between all recipients of one publish.
    Text(Arc<str>),
    /// Protocol-level keepalive ping
    Ping,
    /// Close handshake
    Close,
}
