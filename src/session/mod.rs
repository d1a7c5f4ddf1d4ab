//! Scheduled yoga sessions: CRUD plus the roster state machine governing
//! which users are enrolled.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
