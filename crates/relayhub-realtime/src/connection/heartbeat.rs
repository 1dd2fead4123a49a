//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::handle::ConnectionHandle;
use super::transport::ServerFrame;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// How long after a ping a pong may arrive; `None` disables the check
    pub pong_timeout: Option<Duration>,
}

/// Run the heartbeat loop for a connection.
///
/// Queues a ping every interval. A failed enqueue, or a missing pong when
/// tracking is enabled, moves the connection to Closing.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval_at(Instant::now() + config.ping_interval, config.ping_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        if let Some(timeout) = config.pong_timeout {
            let silent_for = handle.since_last_pong();
            if silent_for > config.ping_interval + timeout {
                tracing::warn!(
                    conn_id = %handle.id,
                    identity = %handle.identity,
                    "Heartbeat timeout (last pong {:?} ago)",
                    silent_for
                );
                handle.close();
                break;
            }
        }

        if let Err(e) = handle.send(ServerFrame::Ping) {
            tracing::debug!(conn_id = %handle.id, "Ping enqueue failed ({}), closing", e);
            handle.close();
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
