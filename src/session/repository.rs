use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::SessionModel;
use crate::shared::AppError;

/// Result of atomically adding a user to a session roster
#[derive(Debug, Clone)]
pub enum AddParticipantResult {
    /// User enrolled, returns the updated session
    Updated(SessionModel),
    /// User id was already on the roster
    AlreadyParticipating,
    /// Session does not exist
    SessionNotFound,
}

/// Result of atomically removing a user from a session roster
#[derive(Debug, Clone)]
pub enum RemoveParticipantResult {
    /// User removed, returns the updated session
    Updated(SessionModel),
    /// User id was not on the roster
    NotParticipating,
    /// Session does not exist
    SessionNotFound,
}

/// Trait for session repository operations.
///
/// Roster mutations go through `add_participant`/`remove_participant`, which
/// check membership and write in one atomic step so two concurrent enrollments
/// cannot lose each other's update. `update_session` deliberately leaves the
/// roster column alone for the same reason.
#[async_trait]
pub trait SessionRepository {
    /// Inserts a new session and returns it with its assigned id
    async fn create_session(&self, session: &SessionModel) -> Result<SessionModel, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<SessionModel>, AppError>;
    async fn find_all(&self) -> Result<Vec<SessionModel>, AppError>;
    /// Updates name, date, description and teacher; the roster is untouched
    async fn update_session(&self, session: &SessionModel) -> Result<SessionModel, AppError>;
    async fn delete_session(&self, id: i64) -> Result<(), AppError>;
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<AddParticipantResult, AppError>;
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<RemoveParticipantResult, AppError>;
}

/// In-memory implementation of SessionRepository for development and testing
///
/// Participant operations take the single map lock for the whole
/// read-check-write, which makes them atomic.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<i64, SessionModel>>,
    next_id: AtomicI64,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates an in-memory repository with pre-populated sessions
    pub fn with_sessions(sessions: Vec<SessionModel>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.sessions.lock().unwrap();
            for mut session in sessions {
                if session.id == 0 {
                    session.id = repo.next_id.fetch_add(1, Ordering::SeqCst);
                }
                map.insert(session.id, session);
            }
        }
        repo
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<SessionModel, AppError> {
        debug!(name = %session.name, "Creating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        let mut saved = session.clone();
        saved.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        sessions.insert(saved.id, saved.clone());

        debug!(session_id = saved.id, "Session created successfully in memory");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id = id, "Fetching session from memory");

        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<SessionModel>, AppError> {
        debug!("Listing all sessions in memory");

        let sessions = self.sessions.lock().unwrap();
        let mut list: Vec<SessionModel> = sessions.values().cloned().collect();
        list.sort_by_key(|s| s.id);
        Ok(list)
    }

    #[instrument(skip(self, session))]
    async fn update_session(&self, session: &SessionModel) -> Result<SessionModel, AppError> {
        debug!(session_id = session.id, "Updating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        let stored = sessions.get_mut(&session.id).ok_or_else(|| {
            warn!(session_id = session.id, "Session not found for update in memory");
            AppError::NotFound("Session not found".to_string())
        })?;

        stored.name = session.name.clone();
        stored.date = session.date;
        stored.description = session.description.clone();
        stored.teacher_id = session.teacher_id;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, id: i64) -> Result<(), AppError> {
        debug!(session_id = id, "Deleting session from memory");

        let mut sessions = self.sessions.lock().unwrap();
        if sessions.remove(&id).is_none() {
            warn!(session_id = id, "Session not found for deletion in memory");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<AddParticipantResult, AppError> {
        debug!(session_id, user_id, "Attempting to add participant atomically");

        let mut sessions = self.sessions.lock().unwrap();

        let session = match sessions.get_mut(&session_id) {
            Some(session) => session,
            None => {
                debug!(session_id, "Session not found");
                return Ok(AddParticipantResult::SessionNotFound);
            }
        };

        if session.has_participant(user_id) {
            debug!(session_id, user_id, "User already on roster");
            return Ok(AddParticipantResult::AlreadyParticipating);
        }

        session.add_participant(user_id);
        session.updated_at = Utc::now();

        let updated = session.clone();
        info!(
            session_id,
            user_id,
            roster_size = updated.users.len(),
            "User enrolled in session (atomic)"
        );

        Ok(AddParticipantResult::Updated(updated))
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<RemoveParticipantResult, AppError> {
        debug!(session_id, user_id, "Attempting to remove participant atomically");

        let mut sessions = self.sessions.lock().unwrap();

        let session = match sessions.get_mut(&session_id) {
            Some(session) => session,
            None => {
                debug!(session_id, "Session not found");
                return Ok(RemoveParticipantResult::SessionNotFound);
            }
        };

        if !session.has_participant(user_id) {
            debug!(session_id, user_id, "User not on roster");
            return Ok(RemoveParticipantResult::NotParticipating);
        }

        session.remove_participant(user_id);
        session.updated_at = Utc::now();

        let updated = session.clone();
        info!(
            session_id,
            user_id,
            roster_size = updated.users.len(),
            "User removed from session (atomic)"
        );

        Ok(RemoveParticipantResult::Updated(updated))
    }
}

/// PostgreSQL implementation of the session repository.
///
/// The roster is a BIGINT[] column; participant operations use a single
/// conditional UPDATE as the linearization point.
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn session_exists(&self, session_id: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM sessions WHERE id = $1) AS present")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id, "Failed to check session existence");
                AppError::Database(e.to_string())
            })?;
        Ok(row.get("present"))
    }
}

const SESSION_COLUMNS: &str =
    "id, name, date, description, teacher_id, users, created_at, updated_at";

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<SessionModel, AppError> {
        debug!(name = %session.name, "Creating session in database");

        let row = sqlx::query(
            "INSERT INTO sessions (name, date, description, teacher_id, users, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&session.name)
        .bind(session.date)
        .bind(&session.description)
        .bind(session.teacher_id)
        .bind(&session.users)
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create session in database");
            AppError::Database(e.to_string())
        })?;

        let mut saved = session.clone();
        saved.id = row.get("id");

        debug!(session_id = saved.id, "Session created successfully in database");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id = id, "Fetching session from database");

        sqlx::query_as::<_, SessionModel>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = id, "Failed to fetch session from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<SessionModel>, AppError> {
        debug!("Listing all sessions in database");

        sqlx::query_as::<_, SessionModel>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list sessions from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self, session))]
    async fn update_session(&self, session: &SessionModel) -> Result<SessionModel, AppError> {
        debug!(session_id = session.id, "Updating session in database");

        // The users column is intentionally not part of this statement;
        // roster changes only happen through the participant operations.
        let row = sqlx::query_as::<_, SessionModel>(&format!(
            "UPDATE sessions SET name = $2, date = $3, description = $4, teacher_id = $5, \
             updated_at = $6 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.id)
        .bind(&session.name)
        .bind(session.date)
        .bind(&session.description)
        .bind(session.teacher_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = session.id, "Failed to update session in database");
            AppError::Database(e.to_string())
        })?;

        row.ok_or_else(|| {
            warn!(session_id = session.id, "Session not found for update");
            AppError::NotFound("Session not found".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, id: i64) -> Result<(), AppError> {
        debug!(session_id = id, "Deleting session from database");

        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id = id, "Failed to delete session from database");
                AppError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(session_id = id, "Session not found for deletion");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<AddParticipantResult, AppError> {
        debug!(session_id, user_id, "Attempting to add participant atomically");

        // Membership check and append happen in one statement; a concurrent
        // enrollment for the same user makes one of the two updates match
        // zero rows instead of writing a duplicate.
        let row = sqlx::query_as::<_, SessionModel>(&format!(
            "UPDATE sessions SET users = array_append(users, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(users)) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id, "Failed to add participant in database");
            AppError::Database(e.to_string())
        })?;

        match row {
            Some(updated) => {
                info!(
                    session_id,
                    user_id,
                    roster_size = updated.users.len(),
                    "User enrolled in session (atomic)"
                );
                Ok(AddParticipantResult::Updated(updated))
            }
            None if self.session_exists(session_id).await? => {
                debug!(session_id, user_id, "User already on roster");
                Ok(AddParticipantResult::AlreadyParticipating)
            }
            None => {
                debug!(session_id, "Session not found");
                Ok(AddParticipantResult::SessionNotFound)
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<RemoveParticipantResult, AppError> {
        debug!(session_id, user_id, "Attempting to remove participant atomically");

        let row = sqlx::query_as::<_, SessionModel>(&format!(
            "UPDATE sessions SET users = array_remove(users, $2), updated_at = $3 \
             WHERE id = $1 AND $2 = ANY(users) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id, "Failed to remove participant in database");
            AppError::Database(e.to_string())
        })?;

        match row {
            Some(updated) => {
                info!(
                    session_id,
                    user_id,
                    roster_size = updated.users.len(),
                    "User removed from session (atomic)"
                );
                Ok(RemoveParticipantResult::Updated(updated))
            }
            None if self.session_exists(session_id).await? => {
                debug!(session_id, user_id, "User not on roster");
                Ok(RemoveParticipantResult::NotParticipating)
            }
            None => {
                debug!(session_id, "Session not found");
                Ok(RemoveParticipantResult::SessionNotFound)
            }
        }
    }
}
