use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the users table.
///
/// Carries the password hash, so it is never serialized directly; API
/// responses go through `UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model; the id is assigned by the repository on
    /// insert.
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        admin: bool,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: 0,
            email,
            first_name,
            last_name,
            password_hash,
            admin,
            created_at: now,
            updated_at: now,
        }
    }
}
