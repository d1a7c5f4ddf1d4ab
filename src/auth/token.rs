use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use super::types::TokenClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations.
///
/// Issuing and validating are pure functions of the token string, the
/// supplied `now` and this configuration, so a single instance can be shared
/// across any number of concurrent requests.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub lifetime_hours: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, lifetime_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_hours,
        }
    }

    /// Reads the signing configuration from the environment.
    ///
    /// A missing or empty `JWT_SECRET` is a fatal startup error: this panics
    /// rather than letting the process serve tokens signed with a guessable
    /// default. `TOKEN_LIFETIME_HOURS` defaults to 24.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        if secret.is_empty() {
            panic!("JWT_SECRET must not be empty");
        }

        let lifetime_hours = std::env::var("TOKEN_LIFETIME_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        Self {
            secret,
            lifetime_hours,
        }
    }

    /// Creates a signed token for the given subject (the user's email)
    pub fn create_token(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let expires_at = now + Duration::hours(self.lifetime_hours);

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Validates a token and returns its claims.
    ///
    /// Malformed structure, a non-HS512 header, a bad signature and an
    /// expired token all collapse into the same `Unauthenticated` error so
    /// the response cannot be used as an oracle; the distinct cause is only
    /// visible in debug logs.
    pub fn validate_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AppError> {
        // Expiry is checked against the injected clock below, not against
        // the library's view of the current time.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;

        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::Unauthenticated
        })?;

        if now.timestamp() >= claims.exp as i64 {
            debug!(sub = %claims.sub, exp = claims.exp, "Token has expired");
            return Err(AppError::Unauthenticated);
        }

        Ok(claims)
    }
}
