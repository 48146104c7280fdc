// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Strava events.
//!
//! The event-delivery path always answers 200: Strava retries
//! aggressively on anything else, and a redelivery storm is worse than
//! a silently dropped event. Processing runs on a detached task whose
//! failures are visible only in logs.

use crate::error::AppError;
use crate::services::ActivityProcessor;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", get(verify).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
}

/// Verification response.
#[derive(Serialize, Default)]
struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Verify webhook subscription (GET).
///
/// Echoes the challenge iff the caller's verify token matches the
/// configured secret; a non-subscribe mode is a malformed request.
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    if params.mode != "subscribe" {
        tracing::warn!(mode = %params.mode, "Webhook verification with unexpected mode");
        return (StatusCode::BAD_REQUEST, Json(VerifyResponse::default()));
    }

    if params.verify_token == state.config.webhook_verify_token {
        tracing::info!("Webhook subscription verified");
        (
            StatusCode::OK,
            Json(VerifyResponse {
                challenge: params.challenge,
            }),
        )
    } else {
        tracing::warn!("Webhook verification failed: invalid token");
        (StatusCode::FORBIDDEN, Json(VerifyResponse::default()))
    }
}

/// Strava webhook event payload.
#[derive(Deserialize, Debug)]
struct WebhookEvent {
    object_type: String, // "activity" or "athlete"
    object_id: u64,
    aspect_type: String, // "create", "update", "delete"
    owner_id: u64,
    #[serde(default)]
    subscription_id: u64,
    #[serde(default)]
    event_time: i64,
}

/// Handle incoming webhook events (POST).
///
/// The body is taken raw and parsed by hand so that a garbled payload
/// (or a missing content-type) still gets a 200 instead of an extractor
/// rejection.
async fn handle_event(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    tracing::info!(
        payload = %String::from_utf8_lossy(&body),
        "Webhook event received (raw)"
    );

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse webhook event");
            return StatusCode::OK; // Still return 200 to Strava to avoid retries
        }
    };

    tracing::info!(
        object_type = %event.object_type,
        object_id = event.object_id,
        aspect_type = %event.aspect_type,
        owner_id = event.owner_id,
        subscription_id = event.subscription_id,
        event_time = event.event_time,
        "Webhook event parsed successfully"
    );

    match (event.object_type.as_str(), event.aspect_type.as_str()) {
        ("activity", "create") => {
            // Accept-and-detach: acknowledge to Strava immediately and
            // run the effect chain on its own task with its own error
            // boundary.
            let processor = ActivityProcessor::new(
                state.strava.clone(),
                state.foods.clone(),
                state.db.clone(),
            );

            tokio::spawn(async move {
                if let Err(e) = processor
                    .process_activity(event.owner_id, event.object_id)
                    .await
                {
                    log_processing_error(event.owner_id, event.object_id, &e);
                }
            });
        }
        _ => {
            // Intentional ignore, not an error. No store lookups happen
            // for these.
            tracing::info!(
                object_type = %event.object_type,
                aspect_type = %event.aspect_type,
                "Ignoring unhandled event type"
            );
        }
    }

    // Always return 200 OK quickly (Strava requirement)
    StatusCode::OK
}

/// Log a failed effect chain; this is the only place the failure is visible.
fn log_processing_error(athlete_id: u64, activity_id: u64, error: &AppError) {
    tracing::error!(
        athlete_id,
        activity_id,
        error = %error,
        "Failed to process activity event"
    );
}
