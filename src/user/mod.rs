//! User accounts: the credential store behind authentication plus the
//! self-service lookup and deletion endpoints.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
