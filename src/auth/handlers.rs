use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::AuthService;
use super::types::{JwtResponse, LoginRequest, MessageResponse, SignupRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for authenticating a user
///
/// POST /api/auth/login
/// Returns a signed bearer token plus the caller's identity details
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<JwtResponse>, AppError> {
    info!(email = %request.email, "Login requested");

    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let response = service.login(request, state.clock.now()).await?;

    Ok(Json(response))
}

/// HTTP handler for registering a new user
///
/// POST /api/auth/register
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(email = %request.email, "Registration requested");

    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let response = service.register(request).await?;

    Ok(Json(response))
}
