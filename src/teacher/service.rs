use std::sync::Arc;
use tracing::instrument;

use super::models::TeacherModel;
use super::repository::TeacherRepository;
use crate::shared::AppError;

/// Read-only service over the teacher directory
pub struct TeacherService {
    repository: Arc<dyn TeacherRepository + Send + Sync>,
}

impl TeacherService {
    pub fn new(repository: Arc<dyn TeacherRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<TeacherModel>, AppError> {
        self.repository.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<TeacherModel, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
    }
}
