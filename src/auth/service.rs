use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::password::{hash_password, verify_password};
use super::token::TokenConfig;
use super::types::{JwtResponse, LoginRequest, MessageResponse, Principal, SignupRequest};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

/// Service for credential verification, token issuance and principal
/// resolution
pub struct AuthService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            user_repository,
            token_config,
        }
    }

    /// Verifies credentials and mints a bearer token for the subject.
    ///
    /// Unknown email and wrong password both answer `Unauthenticated`, so a
    /// failed login does not reveal whether the account exists.
    #[instrument(skip(self, request))]
    pub async fn login(
        &self,
        request: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<JwtResponse, AppError> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                debug!(email = %request.email, "Login attempt for unknown email");
                AppError::Unauthenticated
            })?;

        if !verify_password(&user.password_hash, &request.password) {
            debug!(email = %request.email, "Login attempt with wrong password");
            return Err(AppError::Unauthenticated);
        }

        let token = self.token_config.create_token(&user.email, now)?;

        info!(user_id = user.id, email = %user.email, "User logged in");

        Ok(JwtResponse {
            token,
            token_type: "Bearer".to_string(),
            id: user.id,
            username: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            admin: user.admin,
        })
    }

    /// Registers a new non-admin account
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: SignupRequest) -> Result<MessageResponse, AppError> {
        if self.user_repository.exists_by_email(&request.email).await? {
            warn!(email = %request.email, "Registration rejected, email already taken");
            return Err(AppError::BadRequest(
                "Error: Email is already taken!".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = UserModel::new(
            request.email,
            request.first_name,
            request.last_name,
            password_hash,
            false,
        );

        let saved = self.user_repository.create_user(&user).await?;
        info!(user_id = saved.id, email = %saved.email, "User registered");

        Ok(MessageResponse {
            message: "User registered successfully!".to_string(),
        })
    }

    /// Resolves a bearer token into an authenticated principal.
    ///
    /// A structurally valid token whose subject no longer exists in the
    /// credential store (deleted or renamed account) is rejected the same
    /// way as an invalid one.
    #[instrument(skip(self, token))]
    pub async fn resolve_principal(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, AppError> {
        let claims = self.token_config.validate_token(token, now)?;

        let user = self
            .user_repository
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                debug!(sub = %claims.sub, "Token subject no longer exists");
                AppError::Unauthenticated
            })?;

        Ok(Principal {
            id: user.id,
            email: user.email,
            admin: user.admin,
        })
    }
}
