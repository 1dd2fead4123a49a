//! Real-time WebSocket hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Close a connection whose last pong is older than this. `0` disables
    /// pong tracking; a failed ping send is then the only liveness check.
    #[serde(default)]
    pub pong_timeout_seconds: u64,
    /// Capacity of each connection's outbound queue. A full queue counts as
    /// a delivery failure.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Inbound text frames larger than this are dropped unparsed.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// How often idle rate-limit buckets are swept. `0` disables the sweep.
    #[serde(default = "default_sweep_interval")]
    pub limiter_sweep_interval_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ping_interval_seconds: default_ping_interval(),
            pong_timeout_seconds: 0,
            outbound_buffer_size: default_outbound_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
            limiter_sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl RealtimeConfig {
    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds.max(1))
    }

    /// Pong timeout, if pong tracking is enabled.
    pub fn pong_timeout(&self) -> Option<Duration> {
        (self.pong_timeout_seconds > 0).then(|| Duration::from_secs(self.pong_timeout_seconds))
    }

    /// Limiter sweep interval, if sweeping is enabled.
    pub fn limiter_sweep_interval(&self) -> Option<Duration> {
        (self.limiter_sweep_interval_seconds > 0)
            .then(|| Duration::from_secs(self.limiter_sweep_interval_seconds))
    }
}

fn default_ping_interval() -> u64 {
    20
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_max_frame_bytes() -> usize {
    4096
}

fn default_sweep_interval() -> u64 {
    300
}
