use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::UserService;
use super::types::UserResponse;
use crate::auth::types::Principal;
use crate::shared::{parse_id, AppError, AppState};

/// HTTP handler for fetching a user by id
///
/// GET /api/user/{id}
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id)?;

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.find_by_id(id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// HTTP handler for deleting the caller's own account
///
/// DELETE /api/user/{id}
#[instrument(name = "delete_user", skip(state, principal))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<(), AppError> {
    let id = parse_id(&id)?;

    info!(user_id = id, caller = %principal.email, "Account deletion requested");

    let service = UserService::new(Arc::clone(&state.user_repository));
    service.delete(id, &principal).await
}
