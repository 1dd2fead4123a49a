//! Route definitions for the RelayHub HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes.
///
/// The login rate limit is a route layer, so it runs only for `/login` and
/// before the handler parses the body.
pub fn build_router(state: AppState) -> Router {
    let login_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::login_rate_limit,
        ));

    Router::new()
        .merge(login_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route("/health", get(handlers::health::health))
        .with_state(state)
}
