use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yogastudio::auth::token::TokenConfig;
use yogastudio::session::repository::{
    InMemorySessionRepository, PostgresSessionRepository, SessionRepository,
};
use yogastudio::shared::{AppState, SystemClock};
use yogastudio::teacher::repository::{
    InMemoryTeacherRepository, PostgresTeacherRepository, TeacherRepository,
};
use yogastudio::user::repository::{
    InMemoryUserRepository, PostgresUserRepository, UserRepository,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yogastudio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting yoga studio backend");

    // Missing or empty JWT_SECRET aborts startup here rather than failing
    // per request.
    let token_config = TokenConfig::from_env();

    let user_repository: Arc<dyn UserRepository + Send + Sync>;
    let session_repository: Arc<dyn SessionRepository + Send + Sync>;
    let teacher_repository: Arc<dyn TeacherRepository + Send + Sync>;

    match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL repositories");
            user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
            session_repository = Arc::new(PostgresSessionRepository::new(pool.clone()));
            teacher_repository = Arc::new(PostgresTeacherRepository::new(pool));
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory repositories");
            user_repository = Arc::new(InMemoryUserRepository::new());
            session_repository = Arc::new(InMemorySessionRepository::new());
            teacher_repository = Arc::new(InMemoryTeacherRepository::new());
        }
    }

    let app_state = AppState::new(
        user_repository,
        session_repository,
        teacher_repository,
        token_config,
        Arc::new(SystemClock),
    );

    let app = yogastudio::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://localhost:{port}");
    axum::serve(listener, app).await.expect("Server error");
}
