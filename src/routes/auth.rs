// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth setup routes.
//!
//! The optional Telegram chat ID travels through the OAuth round trip
//! in an HMAC-signed `state` parameter, so the callback cannot be
//! tricked into attaching an attacker-chosen destination.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Telegram chat ID to attach to the user record, if any.
    #[serde(default)]
    telegram_chat_id: Option<String>,
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
) -> Result<Redirect> {
    let chat_id = params.telegram_chat_id.unwrap_or_default();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let oauth_state = sign_state(&chat_id, timestamp, &state.config.oauth_state_key)?;

    let redirect_uri = format!("{}/auth/strava/callback", state.config.public_url);
    let auth_url = state.strava.authorize_url(&redirect_uri, &oauth_state)?;

    tracing::info!(
        has_chat_id = !chat_id.is_empty(),
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, store the user record.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>> {
    // User declined authorization on Strava's side.
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(
            "Authorization denied by user".to_string(),
        ));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    // Recover the chat ID from the signed state. A tampered state drops
    // the chat ID rather than failing the whole flow.
    let telegram_chat_id = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key))
        .filter(|id| !id.is_empty());

    tracing::info!("Exchanging authorization code for tokens");

    let user = state
        .strava
        .handle_oauth_callback(&code, telegram_chat_id)
        .await?;

    Ok(Html(success_page(&user.nickname)))
}

/// Sign `chat_id` + timestamp into a base64url state parameter.
fn sign_state(chat_id: &str, timestamp: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", chat_id, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify HMAC signature and decode the chat ID from the OAuth state parameter.
pub fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "chat_id|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let chat_id = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    // Reconstruct payload and verify signature
    let payload = format!("{}|{}", chat_id, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(chat_id.to_string())
}

/// Minimal success page shown after the OAuth callback.
fn success_page(nickname: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"UTF-8\"><title>FatBurn Relay - Connected</title></head>\n\
         <body>\n\
         <h1>✔️ Connected!</h1>\n\
         <p><strong>{}</strong>, your Strava account is linked.</p>\n\
         <p>Finish an activity and a Fat Burn Report will appear in its description.</p>\n\
         </body>\n\
         </html>\n",
        nickname
    )
}
