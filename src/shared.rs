use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::token::TokenConfig;
use crate::session::repository::SessionRepository;
use crate::teacher::repository::TeacherRepository;
use crate::user::repository::UserRepository;

/// Source of the current time, injected so token validation is deterministic
/// in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used everywhere outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
        token_config: TokenConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
            teacher_repository,
            token_config,
            clock,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, malformed, expired or otherwise invalid credentials.
    /// Carries no detail so callers cannot distinguish the failure cause;
    /// the specific reason is only logged at debug level.
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            // Authorization failures answer 401 as well, there is no
            // distinct 403 in this API.
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Store failure surfaced to HTTP boundary");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

/// Parses a path segment into a numeric id, answering 400 on garbage input.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {raw}")))
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::session::repository::InMemorySessionRepository;
    use crate::teacher::repository::InMemoryTeacherRepository;
    use crate::user::repository::InMemoryUserRepository;

    /// Clock pinned to a fixed instant, for deterministic token tests
    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        session_repository: Option<Arc<dyn SessionRepository + Send + Sync>>,
        teacher_repository: Option<Arc<dyn TeacherRepository + Send + Sync>>,
        token_config: Option<TokenConfig>,
        clock: Option<Arc<dyn Clock>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                session_repository: None,
                teacher_repository: None,
                token_config: None,
                clock: None,
            }
        }

        pub fn with_user_repository(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_session_repository(
            mut self,
            repo: Arc<dyn SessionRepository + Send + Sync>,
        ) -> Self {
            self.session_repository = Some(repo);
            self
        }

        pub fn with_teacher_repository(
            mut self,
            repo: Arc<dyn TeacherRepository + Send + Sync>,
        ) -> Self {
            self.teacher_repository = Some(repo);
            self
        }

        pub fn with_token_config(mut self, config: TokenConfig) -> Self {
            self.token_config = Some(config);
            self
        }

        pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
            self.clock = Some(clock);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                session_repository: self
                    .session_repository
                    .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new())),
                teacher_repository: self
                    .teacher_repository
                    .unwrap_or_else(|| Arc::new(InMemoryTeacherRepository::new())),
                token_config: self
                    .token_config
                    .unwrap_or_else(|| TokenConfig::new("test-secret", 24)),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id(""), Err(AppError::BadRequest(_))));
    }
}
