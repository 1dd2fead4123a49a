//! # relayhub-realtime
//!
//! Real-time WebSocket hub for RelayHub. Provides:
//!
//! - Session registry mapping identities to their live connections, with
//!   exactly-once presence transitions
//! - Broadcast fan-out that isolates and evicts failing recipients
//! - Per-connection supervision: handshake auth, heartbeat, inbound
//!   dispatch, and exactly-once teardown
//! - Token bucket rate limiting per key
//!
//! The engine is transport-agnostic: the HTTP layer adapts its socket into
//! a stream of [`ClientFrame`]s and a sink of [`ServerFrame`]s.

pub mod broadcast;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod rate_limit;
pub mod server;

pub use broadcast::BroadcastHub;
pub use connection::registry::{PresenceTransition, SessionRegistry};
pub use connection::supervisor::ConnectionSupervisor;
pub use connection::transport::{ClientFrame, ServerFrame};
pub use message::{InboundMessage, ServerEvent};
pub use rate_limit::{MessageClass, MessageLimits, RateLimiter, TokenBucket};
pub use server::RealtimeEngine;
