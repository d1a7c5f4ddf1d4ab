use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the teachers table
#[derive(Debug, Clone, FromRow)]
pub struct TeacherModel {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeacherModel {
    pub fn new(first_name: String, last_name: String) -> Self {
        let now = Utc::now();

        Self {
            id: 0,
            first_name,
            last_name,
            created_at: now,
            updated_at: now,
        }
    }
}
