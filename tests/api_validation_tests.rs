// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_competition_name_too_long() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "a".repeat(101), "durationDays": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_competition_blank_name() {
    let (app, state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "   ", "durationDays": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.competition.competition().await.is_none());
}

#[tokio::test]
async fn test_competition_duration_bounds() {
    let (app, _state, _dir) = common::create_test_app().await;

    for days in [0, 366] {
        let response = app
            .clone()
            .oneshot(common::json_request(
                "POST",
                "/api/competition",
                json!({ "name": "Spring", "durationDays": days }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "days = {}", days);
    }
}

#[tokio::test]
async fn test_unknown_avatar_rejected() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/participants",
            json!({ "name": "Ana", "avatar": "not-an-emoji" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_negative_distance_rejected() {
    let (app, state, _dir) = common::create_test_app().await;
    let (participant, _) = add_participant(&app, "Ana").await;

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/participants/{}/logs", participant),
            json!({ "date": "2024-03-01", "completed": true, "duration": 30, "distance": -1.5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let stored = state.competition.participant(participant).await.unwrap();
    assert!(stored.logs.is_empty());
}

#[tokio::test]
async fn test_log_duration_over_one_day_rejected() {
    let (app, _state, _dir) = common::create_test_app().await;
    let (participant, _) = add_participant(&app, "Ana").await;

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/participants/{}/logs", participant),
            json!({ "date": "2024-03-01", "completed": true, "duration": 1441 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_non_http_link_rejected() {
    let (app, _state, _dir) = common::create_test_app().await;
    let (participant, _) = add_participant(&app, "Ana").await;

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/participants/{}/logs", participant),
            json!({ "date": "2024-03-01", "completed": true, "proofUrl": "ftp://files/run.mp4" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_unmanaged_proof_path_rejected() {
    let (app, _state, dir) = common::create_test_app().await;
    let (participant, _) = add_participant(&app, "Ana").await;

    let outside = dir.path().join("selfie.png");
    std::fs::write(&outside, b"png").unwrap();

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/participants/{}/logs", participant),
            json!({
                "date": "2024-03-01",
                "completed": true,
                "proofPath": outside.to_string_lossy(),
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_proof_date_in_path() {
    let (app, _state, _dir) = common::create_test_app().await;
    let (participant, _) = add_participant(&app, "Ana").await;

    let response = app
        .oneshot(common::empty_request(
            "GET",
            &format!("/api/participants/{}/logs/03-01-2024/proof", participant),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn add_participant(app: &axum::Router, name: &str) -> (u64, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/participants",
            json!({ "name": name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    (body["id"].as_u64().unwrap(), body)
}
