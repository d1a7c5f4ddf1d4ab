use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::TeacherModel;

/// API representation of a teacher
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeacherModel> for TeacherResponse {
    fn from(teacher: TeacherModel) -> Self {
        Self {
            id: teacher.id,
            first_name: teacher.first_name,
            last_name: teacher.last_name,
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}
