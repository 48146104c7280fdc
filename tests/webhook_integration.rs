// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration tests for webhook handling.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

/// Create a test app with mock dependencies (no GCP required)
async fn create_offline_test_app() -> axum::Router {
    use fatburn_relay::config::Config;
    use fatburn_relay::db::FirestoreDb;
    use fatburn_relay::routes::create_router;
    use fatburn_relay::services::{FoodCatalog, StravaService};
    use fatburn_relay::AppState;
    use std::sync::Arc;

    let config = Config::test_default();
    let db = FirestoreDb::new_mock();
    let foods = FoodCatalog::load_from_json(
        r#"{ "tiers": [ { "max_grams": 100, "foods": [ { "emoji": "🍩", "name": "a donut" } ] } ] }"#,
    )
    .expect("test food table should load");
    let strava = StravaService::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        db.clone(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        strava,
        foods,
    });

    create_router(state)
}

#[tokio::test]
async fn test_webhook_verification() {
    let app = create_offline_test_app().await;

    let challenge = "test_challenge_123";
    let verify_token = "test_verify_token"; // Matches Config::test_default()

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/webhook?hub.mode=subscribe&hub.challenge={}&hub.verify_token={}",
                    challenge, verify_token
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Verify the response contains the challenge
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["hub.challenge"], challenge);
}

#[tokio::test]
async fn test_webhook_verification_wrong_token() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/webhook?hub.mode=subscribe&hub.challenge=c&hub.verify_token=wrong_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_webhook_verification_wrong_mode() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/webhook?hub.mode=unsubscribe&hub.challenge=c&hub.verify_token=test_verify_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_verification_missing_params() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/webhook")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_event_create_activity() {
    let app = create_offline_test_app().await;

    let event = json!({
        "aspect_type": "create",
        "event_time": 1234567890,
        "object_id": 12345678901_u64,
        "object_type": "activity",
        "owner_id": 123456,
        "subscription_id": 12345
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&event).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Always 200: the effect chain runs detached (here it stops at the
    // empty user store).
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_event_update_activity_ignored() {
    let app = create_offline_test_app().await;

    let event = json!({
        "aspect_type": "update",
        "event_time": 1234567890,
        "object_id": 12345678901_u64,
        "object_type": "activity",
        "owner_id": 123456,
        "subscription_id": 12345,
        "updates": {"title": "New Title"}
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&event).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Logged and dropped, no store lookups
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_event_athlete_ignored() {
    let app = create_offline_test_app().await;

    let event = json!({
        "aspect_type": "update",
        "event_time": 1234567890,
        "object_id": 0,
        "object_type": "athlete",
        "owner_id": 123456,
        "subscription_id": 12345,
        "updates": {"authorized": "false"}
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&event).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_event_malformed_body() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"object_type": "activity"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Parse failures still answer 200 to avoid deliverer retries
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_event_invalid_json_body() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from("not json at all {{{"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Even a syntactically broken body must not trigger a 4xx
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_event_missing_content_type() {
    let app = create_offline_test_app().await;

    let event = json!({
        "aspect_type": "create",
        "event_time": 1234567890,
        "object_id": 987,
        "object_type": "activity",
        "owner_id": 654,
        "subscription_id": 12345
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .body(Body::from(serde_json::to_string(&event).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
