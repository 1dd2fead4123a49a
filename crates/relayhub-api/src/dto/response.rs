//! Response DTOs.

use serde::{Deserialize, Serialize};

use relayhub_realtime::metrics::MetricsSnapshot;

/// Error body: `{"error": <code>, "message": <text>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for the WebSocket upgrade.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Registered WebSocket connections.
    pub connections: usize,
    /// Online identities.
    pub online_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
