//! Login handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use relayhub_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::LoginResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /login
///
/// The per-address rate limit has already been charged by the route layer.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let req = req.normalized();
    // Over-long fields cannot match any account.
    if let Err(e) = req.validate() {
        tracing::info!("Login rejected: {}", e);
        return Err(AppError::invalid_credentials("Invalid username or password").into());
    }

    let identity = match state.credentials.authenticate(&req.username, &req.password).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(user = %req.username, "Login rejected: {}", e.message);
            return Err(e.into());
        }
    };

    let token = state.token_issuer.mint(&identity)?;
    tracing::info!(user = %identity, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.config.auth.token_ttl_seconds,
    }))
}
