//! Application builder: wires router, middleware, and state into an Axum
//! app and runs it.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use relayhub_core::AppResult;
use relayhub_core::config::AppConfig;
use relayhub_core::error::{AppError, ErrorKind};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the RelayHub server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting RelayHub server...");

    let state = AppState::from_config(config)?;
    let addr = state.config.server.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Io, format!("Failed to bind {addr}"), e)
    })?;

    tracing::info!("RelayHub server listening on {}", addr);
    serve(listener, state, shutdown_signal()).await
}

/// Serves on an already-bound listener until `signal` resolves, then shuts
/// the hub down so every WebSocket connection tears down.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = state.realtime.clone();
    let limiter_sweep = engine.spawn_limiter_sweep();
    let login_sweep = spawn_login_sweep(&state);

    let app = build_app(state).into_make_service_with_connect_info::<SocketAddr>();
    let shutdown_engine = engine.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("Shutdown signal received");
            shutdown_engine.shutdown();
        })
        .await;

    engine.shutdown();
    if let Some(task) = login_sweep {
        task.abort();
    }
    if let Some(task) = limiter_sweep {
        let _ = task.await;
    }

    result.map_err(|e| AppError::with_source(ErrorKind::Io, "Server error", e))?;
    tracing::info!("RelayHub server stopped");
    Ok(())
}

/// Periodically drops login buckets that have refilled to capacity.
fn spawn_login_sweep(state: &AppState) -> Option<JoinHandle<()>> {
    let period = state.config.realtime.limiter_sweep_interval()?;
    let limiter = state.login_limiter.clone();
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Swept idle login buckets");
            }
        }
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
