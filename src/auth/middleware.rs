use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the Authorization Bearer header
/// and attaches the resolved Principal to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(principal): Extension<Principal>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "JWT authentication middleware triggered");

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthenticated
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthenticated
    })?;

    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );

    let principal = match service.resolve_principal(token, state.clock.now()).await {
        Ok(principal) => principal,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return Err(e);
        }
    };

    debug!(
        user_id = principal.id,
        email = %principal.email,
        "Authentication successful, adding principal to request"
    );

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
