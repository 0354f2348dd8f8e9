// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition lifecycle over HTTP: create, progress, dashboard, reset.

use axum::http::StatusCode;
use fitness_competition::time_utils::local_today;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_health() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["competitionActive"], false);
}

#[tokio::test]
async fn test_no_competition_yet() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(common::empty_request("GET", "/api/competition"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(common::empty_request("GET", "/api/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert!(body["competition"].is_null());
    assert_eq!(body["participantCount"], 0);
}

#[tokio::test]
async fn test_create_competition_defaults_to_today() {
    let (app, state, _dir) = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "  Spring Challenge ", "durationDays": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["name"], "Spring Challenge");
    assert_eq!(body["startDate"], local_today().to_string());
    assert_eq!(body["durationDays"], 30);
    assert_eq!(body["progress"]["day"], 1);
    assert_eq!(body["progress"]["daysLeft"], 29);
    assert_eq!(body["progress"]["hasStarted"], true);

    // Persisted before the response was sent
    let raw = std::fs::read_to_string(&state.config.data_file).unwrap();
    assert!(raw.contains("Spring Challenge"));
}

#[tokio::test]
async fn test_progress_for_past_start_date() {
    let (app, _state, _dir) = common::create_test_app().await;
    let start = local_today() - chrono::Days::new(4);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "Ten Day", "durationDays": 10, "startDate": start.to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(common::empty_request("GET", "/api/competition"))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["progress"]["day"], 5);
    assert_eq!(body["progress"]["percent"], 50);
    assert_eq!(body["progress"]["daysLeft"], 5);
    assert_eq!(
        body["endDate"],
        (start + chrono::Days::new(9)).to_string()
    );
}

#[tokio::test]
async fn test_second_competition_conflicts() {
    let (app, state, _dir) = common::create_test_app().await;

    let first = common::json_request(
        "POST",
        "/api/competition",
        json!({ "name": "First", "durationDays": 7 }),
    );
    assert_eq!(
        app.clone().oneshot(first).await.unwrap().status(),
        StatusCode::CREATED
    );

    let second = common::json_request(
        "POST",
        "/api/competition",
        json!({ "name": "Second", "durationDays": 14 }),
    );
    let response = app.oneshot(second).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(state.competition.competition().await.unwrap().name, "First");
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let (app, state, _dir) = common::create_test_app().await;

    app.clone()
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "Spring", "durationDays": 30 }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(common::json_request(
            "POST",
            "/api/participants",
            json!({ "name": "Ana" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(common::empty_request("DELETE", "/api/competition"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["success"], true);

    let doc = state.competition.snapshot().await;
    assert!(doc.competition.is_none());
    assert!(doc.participants.is_empty());

    // A new competition can be started after a reset
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "Summer", "durationDays": 30 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_dashboard_shows_top_three() {
    let (app, _state, _dir) = common::create_test_app().await;

    app.clone()
        .oneshot(common::json_request(
            "POST",
            "/api/competition",
            json!({ "name": "Spring", "durationDays": 30 }),
        ))
        .await
        .unwrap();
    for name in ["Ana", "Ben", "Cy", "Dee"] {
        app.clone()
            .oneshot(common::json_request(
                "POST",
                "/api/participants",
                json!({ "name": name }),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(common::empty_request("GET", "/api/dashboard"))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["participantCount"], 4);
    let leaders = body["leaders"].as_array().unwrap();
    assert_eq!(leaders.len(), 3);
    assert_eq!(leaders[0]["badge"], "gold");
    assert_eq!(leaders[2]["badge"], "bronze");
    // All tied at zero, so insertion order holds
    assert_eq!(leaders[0]["participant"]["name"], "Ana");
    assert_eq!(leaders[1]["participant"]["name"], "Ben");
}

#[tokio::test]
async fn test_points_preview() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::empty_request(
            "GET",
            "/api/points-preview?completed=true&walkWithFriend=true",
        ))
        .await
        .unwrap();
    assert_eq!(common::body_json(response).await["points"], 2);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _state, _dir) = common::create_test_app().await;

    let response = app
        .oneshot(common::empty_request("GET", "/api/avatars"))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let body = common::body_json(response).await;
    assert_eq!(body["avatars"].as_array().unwrap().len(), 16);
}
