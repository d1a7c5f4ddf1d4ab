use serde::{Deserialize, Serialize};

/// JWT claims: the subject is the user's email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize, // Issued at timestamp (standard JWT claim)
    pub exp: usize, // Expiration timestamp (standard JWT claim)
}

/// Authenticated identity attached to a request after token validation.
///
/// Threaded explicitly through request extensions; never stored in any
/// global or thread-local context.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub admin: bool,
}

/// Request payload for the login endpoint
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request payload for the register endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

/// Generic message payload used by register and other confirmations
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}
