//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use relayhub_core::config::{RateLimitConfig, RealtimeConfig};
use relayhub_core::traits::TokenVerifier;

use crate::broadcast::BroadcastHub;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::registry::SessionRegistry;
use crate::connection::supervisor::ConnectionSupervisor;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::rate_limit::MessageLimits;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Session registry.
    pub registry: Arc<SessionRegistry>,
    /// Broadcast hub.
    pub hub: BroadcastHub,
    /// Per-identity message limits.
    pub limits: Arc<MessageLimits>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    supervisor: ConnectionSupervisor,
    config: RealtimeConfig,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

/// Point-in-time view of the hub for health reporting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStats {
    /// Registered connections
    pub connections: usize,
    /// Online identities
    pub online_users: usize,
    /// Counters
    pub metrics: MetricsSnapshot,
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        rate_limits: &RateLimitConfig,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(SessionRegistry::new());
        let hub = BroadcastHub::new(Arc::clone(&registry), Arc::clone(&metrics));
        let limits = Arc::new(MessageLimits::new(rate_limits));
        let supervisor = ConnectionSupervisor::new(
            hub.clone(),
            Arc::clone(&limits),
            Arc::clone(&metrics),
            WsAuthenticator::new(verifier),
            config.clone(),
            shutdown.clone(),
        );

        info!("Real-time engine initialized");

        Self {
            registry,
            hub,
            limits,
            metrics,
            supervisor,
            config,
            shutdown,
        }
    }

    /// Per-connection lifecycle driver.
    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Current connection and identity counts plus counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            connections: self.registry.connection_count(),
            online_users: self.registry.identity_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Spawns the periodic sweep of idle rate-limit buckets. Returns `None`
    /// when sweeping is disabled. The task stops on shutdown.
    pub fn spawn_limiter_sweep(&self) -> Option<JoinHandle<()>> {
        let period = self.config.limiter_sweep_interval()?;
        let limits = Arc::clone(&self.limits);
        let shutdown = self.shutdown.clone();

        Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = limits.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "Swept idle rate limit buckets");
                        }
                    }
                }
            }
        }))
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Initiates a graceful shutdown: every connection tears down and new
    /// connections are refused.
    pub fn shutdown(&self) {
        info!(
            connections = self.registry.connection_count(),
            "Shutting down real-time engine"
        );
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relayhub_core::types::Identity;

    use super::*;
    use crate::connection::authenticator::tests::PrefixVerifier;
    use crate::rate_limit::MessageClass;

    #[tokio::test(start_paused = true)]
    async fn test_limiter_sweep_runs_until_shutdown() {
        let config = RealtimeConfig {
            limiter_sweep_interval_seconds: 60,
            ..RealtimeConfig::default()
        };
        let engine = RealtimeEngine::new(config, &RateLimitConfig::default(), Arc::new(PrefixVerifier));
        let sweeper = engine.spawn_limiter_sweep().unwrap();

        assert!(engine.limits.allow(&Identity::from("bob"), MessageClass::Chat));
        assert_eq!(engine.limits.tracked(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(engine.limits.tracked(), 0);

        engine.shutdown();
        sweeper.await.unwrap();
        assert!(engine.is_shutting_down());
    }

    #[tokio::test]
    async fn test_sweep_disabled() {
        let config = RealtimeConfig {
            limiter_sweep_interval_seconds: 0,
            ..RealtimeConfig::default()
        };
        let engine = RealtimeEngine::new(config, &RateLimitConfig::default(), Arc::new(PrefixVerifier));
        assert!(engine.spawn_limiter_sweep().is_none());
    }

    #[test]
    fn test_stats_start_empty() {
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            &RateLimitConfig::default(),
            Arc::new(PrefixVerifier),
        );
        let stats = engine.stats();
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.online_users, 0);
        assert_eq!(stats.metrics.connections_total, 0);
    }
}
