use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use tracing::warn;

use crate::shared::AppError;

/// Hashes a plaintext password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| {
        warn!(error = %e, "Failed to source salt entropy");
        AppError::Internal
    })?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        warn!(error = %e, "Failed to encode password salt");
        AppError::Internal
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!(error = %e, "Failed to hash password");
            AppError::Internal
        })
}

/// Verifies a plaintext password against a stored PHC string.
/// An undecodable stored hash counts as a mismatch, not an error.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
