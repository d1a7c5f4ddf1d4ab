use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::SessionModel;
use super::repository::{AddParticipantResult, RemoveParticipantResult, SessionRepository};
use super::types::SessionRequest;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Service owning session CRUD and the roster state machine
pub struct SessionService {
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

/// Validated subset of a SessionRequest
struct ValidatedSession {
    name: String,
    date: DateTime<Utc>,
    teacher_id: i64,
    description: Option<String>,
}

fn validate(request: SessionRequest) -> Result<ValidatedSession, AppError> {
    let name = request
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Name must not be blank".to_string()))?;
    let date = request
        .date
        .ok_or_else(|| AppError::BadRequest("Date is required".to_string()))?;
    let teacher_id = request
        .teacher_id
        .ok_or_else(|| AppError::BadRequest("Teacher is required".to_string()))?;

    Ok(ValidatedSession {
        name,
        date,
        teacher_id,
        description: request.description,
    })
}

impl SessionService {
    pub fn new(
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            session_repository,
            user_repository,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: SessionRequest) -> Result<SessionModel, AppError> {
        let valid = validate(request)?;

        let session = SessionModel::new(valid.name, valid.date, valid.teacher_id, valid.description);
        let saved = self.session_repository.create_session(&session).await?;

        info!(session_id = saved.id, name = %saved.name, "Session created");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<SessionModel, AppError> {
        self.session_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<SessionModel>, AppError> {
        self.session_repository.find_all().await
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i64, request: SessionRequest) -> Result<SessionModel, AppError> {
        let valid = validate(request)?;

        let mut session = self.get_by_id(id).await?;
        session.name = valid.name;
        session.date = valid.date;
        session.teacher_id = valid.teacher_id;
        session.description = valid.description;

        let updated = self.session_repository.update_session(&session).await?;
        info!(session_id = id, "Session updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        // Existence check first so a missing id answers 404, then a plain
        // whole-unit delete.
        self.get_by_id(id).await?;
        self.session_repository.delete_session(id).await?;

        info!(session_id = id, "Session deleted");
        Ok(())
    }

    /// Enrolls a user in a session.
    ///
    /// Checks run in a fixed order for deterministic error reporting:
    /// session existence, then user existence, then membership. The roster
    /// append itself is the repository's atomic operation, so two concurrent
    /// enrollments cannot lose each other's update; a raced duplicate
    /// surfaces as the same BadRequest the membership pre-check produces.
    #[instrument(skip(self))]
    pub async fn participate(&self, session_id: i64, user_id: i64) -> Result<(), AppError> {
        let session = self.get_by_id(session_id).await?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if session.has_participant(user_id) {
            warn!(session_id, user_id, "User already participates in session");
            return Err(AppError::BadRequest(
                "User already participates in this session".to_string(),
            ));
        }

        match self
            .session_repository
            .add_participant(session_id, user_id)
            .await?
        {
            AddParticipantResult::Updated(_) => Ok(()),
            AddParticipantResult::AlreadyParticipating => Err(AppError::BadRequest(
                "User already participates in this session".to_string(),
            )),
            AddParticipantResult::SessionNotFound => {
                Err(AppError::NotFound("Session not found".to_string()))
            }
        }
    }

    /// Removes a user from a session roster.
    ///
    /// User existence is deliberately not re-verified here: membership is the
    /// authoritative fact on removal, since an id can only be on the roster
    /// if the user existed when it was added.
    #[instrument(skip(self))]
    pub async fn no_longer_participate(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let session = self.get_by_id(session_id).await?;

        if !session.has_participant(user_id) {
            warn!(session_id, user_id, "User does not participate in session");
            return Err(AppError::BadRequest(
                "User does not participate in this session".to_string(),
            ));
        }

        match self
            .session_repository
            .remove_participant(session_id, user_id)
            .await?
        {
            RemoveParticipantResult::Updated(_) => Ok(()),
            RemoveParticipantResult::NotParticipating => Err(AppError::BadRequest(
                "User does not participate in this session".to_string(),
            )),
            RemoveParticipantResult::SessionNotFound => {
                Err(AppError::NotFound("Session not found".to_string()))
            }
        }
    }
}
