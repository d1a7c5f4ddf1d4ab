use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations (the credential store)
#[async_trait]
pub trait UserRepository {
    /// Inserts a new user and returns it with its assigned id
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;
    async fn delete_user(&self, id: i64) -> Result<(), AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and lost when the application restarts; ids are
/// assigned from a local counter the way a serial column would.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<i64, UserModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates an in-memory repository with pre-populated users, assigning
    /// ids to any user created with the placeholder id
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.users.lock().unwrap();
            for mut user in users {
                if user.id == 0 {
                    user.id = repo.next_id.fetch_add(1, Ordering::SeqCst);
                }
                map.insert(user.id, user);
            }
        }
        repo
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "User email already exists in memory");
            return Err(AppError::Database("Email already exists".to_string()));
        }

        let mut saved = user.clone();
        saved.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        users.insert(saved.id, saved.clone());

        debug!(user_id = saved.id, "User created successfully in memory");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = id, "Fetching user from memory");

        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from memory");

        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().any(|u| u.email == email))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        debug!(user_id = id, "Deleting user from memory");

        let mut users = self.users.lock().unwrap();
        if users.remove(&id).is_none() {
            warn!(user_id = id, "User not found for deletion in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}

/// PostgreSQL implementation of the user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in database");

        let row = sqlx::query(
            "INSERT INTO users (email, first_name, last_name, password_hash, admin, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::Database(e.to_string())
        })?;

        let mut saved = user.clone();
        saved.id = row.get("id");

        debug!(user_id = saved.id, "User created successfully in database");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = id, "Fetching user from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, first_name, last_name, password_hash, admin, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = id, "Failed to fetch user from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, first_name, last_name, password_hash, admin, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS present")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to check email existence in database");
                AppError::Database(e.to_string())
            })?;

        Ok(row.get("present"))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        debug!(user_id = id, "Deleting user from database");

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = id, "Failed to delete user from database");
                AppError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = id, "User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> UserModel {
        UserModel::new(
            email.to_string(),
            "Margot".to_string(),
            "Delahaye".to_string(),
            "hash".to_string(),
            false,
        )
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create_user(&user("a@studio.com")).await.unwrap();
        let second = repo.create_user(&user("b@studio.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.user_count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&user("a@studio.com")).await.unwrap();

        let result = repo.create_user(&user("a@studio.com")).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&user("a@studio.com")).await.unwrap();

        assert!(repo.find_by_email("a@studio.com").await.unwrap().is_some());
        assert!(repo.find_by_email("b@studio.com").await.unwrap().is_none());
        assert!(repo.exists_by_email("a@studio.com").await.unwrap());
        assert!(!repo.exists_by_email("b@studio.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.create_user(&user("a@studio.com")).await.unwrap();

        repo.delete_user(saved.id).await.unwrap();
        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());

        let result = repo.delete_user(saved.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_with_users_assigns_placeholder_ids() {
        let repo = InMemoryUserRepository::with_users(vec![user("a@studio.com")]);
        let found = repo.find_by_email("a@studio.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);
    }
}
