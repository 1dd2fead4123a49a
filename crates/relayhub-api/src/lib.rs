//! # relayhub-api
//!
//! HTTP API layer for RelayHub built on Axum.
//!
//! Provides the login endpoint, the WebSocket upgrade, the health probe,
//! middleware (login rate limiting, CORS), extractors, DTOs, and error
//! mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use error::ApiError;
pub use state::AppState;
