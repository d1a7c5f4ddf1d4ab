use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::UserModel;
use super::repository::UserRepository;
use crate::auth::types::Principal;
use crate::shared::AppError;

/// Service for user account lookups and self-service deletion
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<UserModel, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Deletes a user account. A caller may only delete their own account;
    /// a mismatch between the principal and the target answers 401.
    #[instrument(skip(self, principal))]
    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), AppError> {
        let user = self.find_by_id(id).await?;

        if user.email != principal.email {
            warn!(
                user_id = id,
                principal_email = %principal.email,
                "Attempt to delete another user's account"
            );
            return Err(AppError::Unauthorized(
                "You can only delete your own account".to_string(),
            ));
        }

        self.repository.delete_user(id).await?;
        info!(user_id = id, "User account deleted");
        Ok(())
    }
}
