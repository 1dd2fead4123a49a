//! Connection supervisor: drives one authenticated connection from
//! registration to teardown.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use relayhub_core::config::RealtimeConfig;
use relayhub_core::error::AppError;
use relayhub_core::types::Identity;

use crate::broadcast::BroadcastHub;
use crate::message::types::{InboundMessage, ServerEvent};
use crate::message::validator::parse_inbound;
use crate::metrics::RealtimeMetrics;
use crate::rate_limit::{MessageClass, MessageLimits};

use super::authenticator::WsAuthenticator;
use super::handle::ConnectionHandle;
use super::heartbeat::{HeartbeatConfig, run_heartbeat};
use super::transport::{ClientFrame, ServerFrame};

/// Upper bound on waiting for a connection's tasks after teardown.
const TASK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the per-connection lifecycle against the shared hub state.
#[derive(Debug, Clone)]
pub struct ConnectionSupervisor {
    hub: BroadcastHub,
    limits: Arc<MessageLimits>,
    metrics: Arc<RealtimeMetrics>,
    authenticator: WsAuthenticator,
    config: RealtimeConfig,
    shutdown: CancellationToken,
}

impl ConnectionSupervisor {
    pub(crate) fn new(
        hub: BroadcastHub,
        limits: Arc<MessageLimits>,
        metrics: Arc<RealtimeMetrics>,
        authenticator: WsAuthenticator,
        config: RealtimeConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            hub,
            limits,
            metrics,
            authenticator,
            config,
            shutdown,
        }
    }

    /// Handshake step: resolve the presented token before any upgrade.
    /// Nothing is registered or broadcast on failure.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, AppError> {
        self.authenticator.authenticate(token).inspect_err(|e| {
            self.metrics.record_handshake_rejected();
            tracing::warn!("WebSocket handshake rejected: {}", e.message);
        })
    }

    /// Supervise an upgraded connection until it closes.
    ///
    /// `inbound` yields frames read from the client; `outbound` is written
    /// only by this connection's writer task. Teardown runs exactly once on
    /// every exit path, including when this future is dropped.
    pub async fn run<R, E, W>(&self, identity: Identity, mut inbound: R, outbound: W)
    where
        R: Stream<Item = Result<ClientFrame, E>> + Unpin,
        E: Display,
        W: Sink<ServerFrame> + Unpin + Send + 'static,
        W::Error: Display,
    {
        if self.shutdown.is_cancelled() {
            tracing::debug!(identity = %identity, "Engine shutting down, refusing connection");
            return;
        }

        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(
            identity,
            tx,
            self.shutdown.child_token(),
        ));
        let writer = tokio::spawn(forward_outbound(Arc::clone(&handle), rx, outbound));

        self.metrics.record_connect();
        let mut session = Session {
            supervisor: self,
            handle: Arc::clone(&handle),
            tasks: vec![writer],
        };

        self.hub.join(&handle);
        tracing::info!(
            conn_id = %handle.id,
            identity = %handle.identity,
            "WebSocket connection registered"
        );

        session.tasks.push(tokio::spawn(run_heartbeat(
            Arc::clone(&handle),
            HeartbeatConfig {
                ping_interval: self.config.ping_interval(),
                pong_timeout: self.config.pong_timeout(),
            },
        )));

        self.read_loop(&handle, &mut inbound).await;

        session.teardown();
        session.drain_tasks().await;
    }

    async fn read_loop<R, E>(&self, handle: &ConnectionHandle, inbound: &mut R)
    where
        R: Stream<Item = Result<ClientFrame, E>> + Unpin,
        E: Display,
    {
        loop {
            let frame = tokio::select! {
                biased;
                _ = handle.closed() => break,
                frame = inbound.next() => frame,
            };

            match frame {
                Some(Ok(ClientFrame::Text(text))) => {
                    handle.touch();
                    self.dispatch(handle, &text);
                }
                Some(Ok(ClientFrame::Pong)) => handle.record_pong(),
                Some(Ok(ClientFrame::Ping | ClientFrame::Binary(_))) => handle.touch(),
                Some(Ok(ClientFrame::Close)) => {
                    tracing::debug!(conn_id = %handle.id, "Client sent close");
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %handle.id, "WebSocket read error: {}", e);
                    break;
                }
                None => break,
            }
        }
    }

    /// Validate, rate limit, and relay one inbound text frame.
    fn dispatch(&self, handle: &ConnectionHandle, raw: &str) {
        let message = match parse_inbound(raw, self.config.max_frame_bytes) {
            Ok(message) => message,
            Err(e) => {
                self.metrics.record_dropped();
                tracing::debug!(conn_id = %handle.id, "Dropping inbound frame: {}", e);
                return;
            }
        };

        let (class, event) = match message {
            InboundMessage::Typing { is_typing } => (
                MessageClass::Typing,
                ServerEvent::Typing {
                    user: handle.identity.clone(),
                    is_typing,
                },
            ),
            InboundMessage::Chat { text } => (
                MessageClass::Chat,
                ServerEvent::Chat {
                    from: handle.identity.clone(),
                    text,
                },
            ),
            InboundMessage::Unknown => {
                tracing::debug!(conn_id = %handle.id, "Ignoring unknown message type");
                return;
            }
        };
        self.metrics.record_received();

        if !self.limits.allow(&handle.identity, class) {
            self.metrics.record_rate_limited();
            tracing::debug!(
                conn_id = %handle.id,
                identity = %handle.identity,
                class = %class,
                "Message rate limited"
            );
            if let Err(e) = self.hub.send_to(handle, &ServerEvent::rate_limited()) {
                tracing::debug!(conn_id = %handle.id, "Failed to send rate limit error: {}", e);
                handle.close();
            }
            return;
        }

        self.hub.publish(&event, Some(handle.id));
    }
}

/// Teardown guard for one supervised connection.
struct Session<'a> {
    supervisor: &'a ConnectionSupervisor,
    handle: Arc<ConnectionHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Session<'_> {
    /// Close, unregister, and announce departure. Only the first call has
    /// any effect.
    fn teardown(&mut self) {
        self.handle.close();
        if !self.handle.finish() {
            return;
        }
        let sup = self.supervisor;
        sup.metrics.record_disconnect();

        if sup.hub.leave(&self.handle).is_none() {
            tracing::debug!(conn_id = %self.handle.id, "Connection was already evicted");
        }

        tracing::info!(
            conn_id = %self.handle.id,
            identity = %self.handle.identity,
            idle_ms = self.handle.idle_for().as_millis() as u64,
            "WebSocket connection closed"
        );
    }

    async fn drain_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            let abort = task.abort_handle();
            if tokio::time::timeout(TASK_DRAIN_TIMEOUT, task).await.is_err() {
                abort.abort();
            }
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.teardown();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Writer task: the only code that touches the outbound sink. Ends with a
/// close frame once the connection is closing or the sink fails.
async fn forward_outbound<W>(
    handle: Arc<ConnectionHandle>,
    mut queue: mpsc::Receiver<ServerFrame>,
    mut sink: W,
) where
    W: Sink<ServerFrame> + Unpin,
    W::Error: Display,
{
    loop {
        let frame = tokio::select! {
            biased;
            frame = queue.recv() => frame,
            _ = handle.closed() => None,
        };
        let Some(frame) = frame else {
            break;
        };
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(conn_id = %handle.id, "WebSocket write failed: {}", e);
            handle.close();
            break;
        }
    }

    let _ = sink.send(ServerFrame::Close).await;
    let _ = sink.close().await;
}
