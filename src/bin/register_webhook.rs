// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot tool: register the webhook push subscription with Strava.
//!
//! Run after deploying the relay so `PUBLIC_URL/webhook` receives
//! events. Strava calls back the verification handshake during
//! registration, so the server must already be reachable.

use fatburn_relay::config::Config;
use fatburn_relay::services::StravaClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;

    let client = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );

    let callback_url = format!("{}/webhook", config.public_url);
    tracing::info!(callback_url = %callback_url, "Registering push subscription");

    let subscription_id = client
        .create_push_subscription(&callback_url, &config.webhook_verify_token)
        .await?;

    println!("Push subscription registered: id={}", subscription_id);
    Ok(())
}
