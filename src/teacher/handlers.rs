use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::service::TeacherService;
use super::types::TeacherResponse;
use crate::shared::{parse_id, AppError, AppState};

/// HTTP handler for listing all teachers
///
/// GET /api/teacher
#[instrument(name = "list_teachers", skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    let service = TeacherService::new(Arc::clone(&state.teacher_repository));
    let teachers = service.find_all().await?;

    Ok(Json(teachers.into_iter().map(TeacherResponse::from).collect()))
}

/// HTTP handler for fetching a teacher by id
///
/// GET /api/teacher/{id}
#[instrument(name = "get_teacher", skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeacherResponse>, AppError> {
    let id = parse_id(&id)?;

    let service = TeacherService::new(Arc::clone(&state.teacher_repository));
    let teacher = service.find_by_id(id).await?;

    Ok(Json(TeacherResponse::from(teacher)))
}
