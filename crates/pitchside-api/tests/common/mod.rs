//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use pitchside_intake::application::confirm::FailurePolicy;
use pitchside_intake::application::quick_create::PendingDraftPolicy;
use pitchside_store::pg_draft_repository::PgDraftRepository;
use pitchside_store::pg_event_repository::PgEventRepository;
use pitchside_store::pg_player_directory::PgPlayerDirectory;
use pitchside_test_support::FixedClock;
use sqlx::PgPool;
use tower::ServiceExt;

use pitchside_api::routes;
use pitchside_api::state::AppState;

/// Build the full app router over `PostgreSQL` adapters and a clock fixed on
/// 2026-03-02. Uses the same router as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let app_state = AppState::new(
        Arc::new(FixedClock::on(2026, 3, 2)),
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgDraftRepository::new(pool.clone())),
        Arc::new(PgPlayerDirectory::new(pool)),
        FailurePolicy::LeaveInPlace,
        PendingDraftPolicy::Migrate,
        TimeDelta::hours(1),
    );
    routes::app(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

fn with_json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, with_json("POST", uri, body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, with_json("PUT", uri, body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
