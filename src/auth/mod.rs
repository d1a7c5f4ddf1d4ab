//! Token lifecycle and authentication: issuing a signed bearer token at
//! login, validating it on each request and resolving the caller's identity.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod types;

pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use types::Principal;
