use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::SessionService;
use super::types::{SessionRequest, SessionResponse};
use crate::shared::{parse_id, AppError, AppState};

fn service(state: &AppState) -> SessionService {
    SessionService::new(
        Arc::clone(&state.session_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for listing all sessions
///
/// GET /api/session
#[instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = service(&state).find_all().await?;

    Ok(Json(
        sessions.into_iter().map(SessionResponse::from).collect(),
    ))
}

/// HTTP handler for fetching a session by id
///
/// GET /api/session/{id}
#[instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_id(&id)?;
    let session = service(&state).get_by_id(id).await?;

    Ok(Json(SessionResponse::from(session)))
}

/// HTTP handler for creating a session
///
/// POST /api/session
#[instrument(name = "create_session", skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = service(&state).create(request).await?;

    info!(session_id = session.id, "Session created via API");
    Ok(Json(SessionResponse::from(session)))
}

/// HTTP handler for updating a session
///
/// PUT /api/session/{id}
#[instrument(name = "update_session", skip(state, request))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_id(&id)?;
    let session = service(&state).update(id, request).await?;

    Ok(Json(SessionResponse::from(session)))
}

/// HTTP handler for deleting a session
///
/// DELETE /api/session/{id}
#[instrument(name = "delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), AppError> {
    let id = parse_id(&id)?;
    service(&state).delete(id).await
}

/// HTTP handler for enrolling a user in a session
///
/// POST /api/session/{id}/participate/{userId}
#[instrument(name = "participate", skip(state))]
pub async fn participate(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<(), AppError> {
    let id = parse_id(&id)?;
    let user_id = parse_id(&user_id)?;

    service(&state).participate(id, user_id).await
}

/// HTTP handler for withdrawing a user from a session
///
/// DELETE /api/session/{id}/participate/{userId}
#[instrument(name = "no_longer_participate", skip(state))]
pub async fn no_longer_participate(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<(), AppError> {
    let id = parse_id(&id)?;
    let user_id = parse_id(&user_id)?;

    service(&state).no_longer_participate(id, user_id).await
}
