//! End-to-end tests driving the full router over in-memory repositories:
//! registration, login, bearer-token enforcement and the session
//! participation workflow.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use yogastudio::auth::token::TokenConfig;
use yogastudio::session::repository::InMemorySessionRepository;
use yogastudio::shared::{AppState, SystemClock};
use yogastudio::teacher::models::TeacherModel;
use yogastudio::teacher::repository::InMemoryTeacherRepository;
use yogastudio::user::repository::InMemoryUserRepository;

fn app() -> Router {
    let teacher_repository = Arc::new(InMemoryTeacherRepository::with_teachers(vec![
        TeacherModel::new("Margot".to_string(), "Delahaye".to_string()),
    ]));

    let state = AppState::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemorySessionRepository::new()),
        teacher_repository,
        TokenConfig::new("integration-test-secret", 24),
        Arc::new(SystemClock),
    );

    yogastudio::app(state)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user and logs them in, returning (token, user id)
async fn register_and_login(app: &Router, email: &str) -> (String, i64) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": email,
                "password": "test!1234",
                "firstName": "Test",
                "lastName": "User"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email, "password": "test!1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["type"], "Bearer");
    (
        body["token"].as_str().unwrap().to_string(),
        body["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/session", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(empty_request("GET", "/api/teacher", Some("not.a.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_participation_workflow() {
    let app = app();
    let (token, user_id) = register_and_login(&app, "yoga@studio.com").await;

    // Create a session against the seeded teacher
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session",
            Some(&token),
            json!({
                "name": "Morning flow",
                "date": Utc::now().to_rfc3339(),
                "teacher_id": 1,
                "description": "Beginner friendly"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = body_json(response).await;
    let session_id = session["id"].as_i64().unwrap();
    assert_eq!(session["users"], json!([]));

    // Enroll
    let uri = format!("/api/session/{session_id}/participate/{user_id}");
    let response = app
        .clone()
        .oneshot(empty_request("POST", &uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Roster now holds exactly this user
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/session/{session_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    let session = body_json(response).await;
    assert_eq!(session["users"], json!([user_id]));

    // Enrolling twice answers 400
    let response = app
        .clone()
        .oneshot(empty_request("POST", &uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Withdraw, roster is restored
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/session/{session_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    let session = body_json(response).await;
    assert_eq!(session["users"], json!([]));

    // Withdrawing twice answers 400, unknown session answers 404
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/api/session/999/participate/{user_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_validation_and_id_parsing() {
    let app = app();
    let (token, _) = register_and_login(&app, "yoga@studio.com").await;

    // Blank name is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session",
            Some(&token),
            json!({"name": "  ", "date": Utc::now().to_rfc3339(), "teacher_id": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-integer ids are rejected before any lookup
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/session/abc", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request(
            "POST",
            "/api/session/1/participate/xyz",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_directory() {
    let app = app();
    let (token, _) = register_and_login(&app, "yoga@studio.com").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/teacher", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let teachers = body_json(response).await;
    assert_eq!(teachers.as_array().unwrap().len(), 1);
    assert_eq!(teachers[0]["firstName"], "Margot");

    let response = app
        .oneshot(empty_request("GET", "/api/teacher/42", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_deletion_invalidates_token() {
    let app = app();
    let (token, user_id) = register_and_login(&app, "yoga@studio.com").await;
    let (other_token, _) = register_and_login(&app, "other@studio.com").await;

    // Another user cannot delete this account
    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/user/{user_id}"),
            Some(&other_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The owner can
    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/user/{user_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A structurally valid token whose subject is gone no longer
    // authenticates
    let response = app
        .oneshot(empty_request("GET", "/api/session", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
