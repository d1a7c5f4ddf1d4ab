use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::SessionModel;

/// Request payload for creating or updating a session.
///
/// Fields are optional at the serde level so that missing values surface as
/// 400 validation errors instead of deserialization failures; `validate`
/// enforces the actual requirements.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub teacher_id: Option<i64>,
    pub description: Option<String>,
}

/// API representation of a session, roster included as plain user ids
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub teacher_id: i64,
    pub description: Option<String>,
    pub users: Vec<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<SessionModel> for SessionResponse {
    fn from(session: SessionModel) -> Self {
        Self {
            id: session.id,
            name: session.name,
            date: session.date,
            teacher_id: session.teacher_id,
            description: session.description,
            users: session.users,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_response_field_names() {
        let session = SessionModel::new(
            "Morning flow".to_string(),
            Utc::now(),
            1,
            Some("Beginner friendly".to_string()),
        );

        let json = serde_json::to_value(SessionResponse::from(session)).unwrap();
        assert_eq!(json["name"], "Morning flow");
        assert_eq!(json["teacher_id"], 1);
        assert!(json["users"].as_array().unwrap().is_empty());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_session_request_tolerates_missing_fields() {
        let request: SessionRequest = serde_json::from_str(r#"{"name": "Morning flow"}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("Morning flow"));
        assert!(request.date.is_none());
        assert!(request.teacher_id.is_none());
    }
}
