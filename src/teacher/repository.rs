use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::TeacherModel;
use crate::shared::AppError;

/// Trait for teacher repository operations. The directory is read-only for
/// the API; rows are provisioned out of band.
#[async_trait]
pub trait TeacherRepository {
    async fn find_all(&self) -> Result<Vec<TeacherModel>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TeacherModel>, AppError>;
}

/// In-memory implementation of TeacherRepository for development and testing
pub struct InMemoryTeacherRepository {
    teachers: Mutex<HashMap<i64, TeacherModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryTeacherRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTeacherRepository {
    pub fn new() -> Self {
        Self {
            teachers: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates an in-memory repository with pre-populated teachers
    pub fn with_teachers(teachers: Vec<TeacherModel>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.teachers.lock().unwrap();
            for mut teacher in teachers {
                if teacher.id == 0 {
                    teacher.id = repo.next_id.fetch_add(1, Ordering::SeqCst);
                }
                map.insert(teacher.id, teacher);
            }
        }
        repo
    }
}

#[async_trait]
impl TeacherRepository for InMemoryTeacherRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<TeacherModel>, AppError> {
        debug!("Listing all teachers in memory");

        let teachers = self.teachers.lock().unwrap();
        let mut list: Vec<TeacherModel> = teachers.values().cloned().collect();
        list.sort_by_key(|t| t.id);
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<TeacherModel>, AppError> {
        debug!(teacher_id = id, "Fetching teacher from memory");

        let teachers = self.teachers.lock().unwrap();
        Ok(teachers.get(&id).cloned())
    }
}

/// PostgreSQL implementation of the teacher repository
pub struct PostgresTeacherRepository {
    pool: PgPool,
}

impl PostgresTeacherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherRepository for PostgresTeacherRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<TeacherModel>, AppError> {
        debug!("Listing all teachers in database");

        sqlx::query_as::<_, TeacherModel>(
            "SELECT id, first_name, last_name, created_at, updated_at FROM teachers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list teachers from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<TeacherModel>, AppError> {
        debug!(teacher_id = id, "Fetching teacher from database");

        sqlx::query_as::<_, TeacherModel>(
            "SELECT id, first_name, last_name, created_at, updated_at FROM teachers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, teacher_id = id, "Failed to fetch teacher from database");
            AppError::Database(e.to_string())
        })
    }
}
