use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the sessions table.
///
/// The roster (`users`) has set semantics: a user id appears at most once.
/// Membership only changes through the repository's atomic participant
/// operations.
#[derive(Debug, Clone, FromRow)]
pub struct SessionModel {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub teacher_id: i64,
    pub users: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionModel {
    /// Creates a new session with an empty roster; the id is assigned by the
    /// repository on insert.
    pub fn new(
        name: String,
        date: DateTime<Utc>,
        teacher_id: i64,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: 0,
            name,
            date,
            description,
            teacher_id,
            users: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether a user is currently enrolled
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    /// Adds a user to the roster, preserving set semantics
    pub fn add_participant(&mut self, user_id: i64) {
        if !self.has_participant(user_id) {
            self.users.push(user_id);
        }
    }

    /// Removes a user from the roster
    pub fn remove_participant(&mut self, user_id: i64) {
        self.users.retain(|&u| u != user_id);
    }
}
