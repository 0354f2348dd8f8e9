// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
};
use fitness_competition::config::Config;
use fitness_competition::routes::create_router;
use fitness_competition::AppState;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a test app backed by a fresh temporary data directory.
/// Returns the router, the shared state, and the directory guard.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (app, state) = create_test_app_in(&dir).await;
    (app, state, dir)
}

/// Create a test app over an existing data directory.
#[allow(dead_code)]
pub async fn create_test_app_in(dir: &TempDir) -> (axum::Router, Arc<AppState>) {
    let config = Config::for_data_dir(dir.path().to_path_buf());
    let state = Arc::new(AppState::load(config).await);
    (create_router(state.clone()), state)
}

/// Build a request with a JSON body.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
