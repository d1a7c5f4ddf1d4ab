// Library crate for the yoga studio backend
// This file exposes the public API for integration tests

pub mod auth;
pub mod session;
pub mod shared;
pub mod teacher;
pub mod user;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

// Re-export commonly used types for easier access in tests
pub use auth::Principal;
pub use shared::{AppError, AppState};

/// Builds the full application router. Login and register are public; every
/// other route sits behind the JWT middleware.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/session",
            get(session::handlers::list_sessions).post(session::handlers::create_session),
        )
        .route(
            "/api/session/:id",
            get(session::handlers::get_session)
                .put(session::handlers::update_session)
                .delete(session::handlers::delete_session),
        )
        .route(
            "/api/session/:id/participate/:user_id",
            post(session::handlers::participate).delete(session::handlers::no_longer_participate),
        )
        .route(
            "/api/user/:id",
            get(user::handlers::get_user).delete(user::handlers::delete_user),
        )
        .route("/api/teacher", get(teacher::handlers::list_teachers))
        .route("/api/teacher/:id", get(teacher::handlers::get_teacher))
        .route_layer(from_fn_with_state(state.clone(), auth::jwt_auth));

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .merge(protected)
        .with_state(state)
}
