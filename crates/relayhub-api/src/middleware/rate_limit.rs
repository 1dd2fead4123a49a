//! Per-address login rate limiting.
//!
//! Applied as a route layer so the check runs before the body is read.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use relayhub_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::ClientAddr;
use crate::state::AppState;

/// Consume one login token for the client address or reject with 429.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.login_limiter.try_consume(&addr) {
        tracing::warn!(client = %addr, "Login rate limit exceeded");
        return Err(AppError::rate_limited("Too many login attempts").into());
    }
    Ok(next.run(request).await)
}
