// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching and updating activities.
//!
//! Handles:
//! - Activity fetching (including calories and description)
//! - Activity description updates
//! - OAuth code exchange and token refresh
//! - Push-subscription registration

use crate::error::AppError;
use serde::Deserialize;

const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";
const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// OAuth scope requested from Strava: read activity detail, write the
/// annotated description back.
const OAUTH_SCOPE: &str = "activity:read_all,activity:write";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://www.strava.com/api/v3".to_string(),
            token_url: STRAVA_TOKEN_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Create a client pointed at an alternate API host. The OAuth token
    /// endpoint is served under the same host at `/oauth/token`.
    pub fn with_base_url(client_id: String, client_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: format!("{}/oauth/token", base_url),
            base_url,
            client_id,
            client_secret,
        }
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity, AppError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Update an activity's description.
    pub async fn update_activity_description(
        &self,
        access_token: &str,
        activity_id: u64,
        description: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);

        let body = serde_json::json!({
            "description": description
        });

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }
        Ok(())
    }

    /// Refresh an expiring access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::TokenRefresh(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TokenRefresh(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::TokenRefresh(format!("JSON parse error: {}", e)))
    }

    /// Exchange an authorization code for tokens (includes athlete info).
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(AppError::AuthExchange(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AuthExchange(format!("JSON parse error: {}", e)))
    }

    /// Register a webhook push subscription with Strava.
    pub async fn create_push_subscription(
        &self,
        callback_url: &str,
        verify_token: &str,
    ) -> Result<u64, AppError> {
        let url = format!("{}/push_subscriptions", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("callback_url", callback_url),
                ("verify_token", verify_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        let subscription: PushSubscription = self.check_response_json(response).await?;
        Ok(subscription.id)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    pub username: Option<String>,
    pub firstname: String,
    pub lastname: String,
}

impl StravaAthlete {
    /// Display nickname: Strava username, or first + last name.
    pub fn nickname(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.firstname, self.lastname),
        }
    }
}

/// Detailed Strava activity response.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    pub name: String,
    pub sport_type: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    pub calories: Option<f64>,
    pub description: Option<String>,
}

/// Push subscription registration response.
#[derive(Debug, Clone, Deserialize)]
struct PushSubscription {
    id: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::FirestoreDb;
use crate::models::User;
use chrono::{DateTime, Duration, Utc};

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// High-level Strava service that manages token lifecycle and API calls.
///
/// Encapsulates:
/// - Token expiry check with a 5-minute refresh margin
/// - Refreshed tokens persisted to Firestore before first use, so a
///   crash mid-refresh cannot leave a stale token believed valid
/// - OAuth callback handling (code exchange + user upsert)
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    db: FirestoreDb,
}

/// True if a token expiring at `expires_at` should be refreshed now.
pub fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expires_at
}

impl StravaService {
    /// Create a new Strava service.
    pub fn new(client_id: String, client_secret: String, db: FirestoreDb) -> Self {
        Self {
            client: StravaClient::new(client_id, client_secret),
            db,
        }
    }

    /// Create a service around an already-built client (alternate host).
    pub fn with_client(client: StravaClient, db: FirestoreDb) -> Self {
        Self { client, db }
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user,
    /// refreshing and persisting if the stored one expires within the
    /// 5-minute margin.
    pub async fn valid_access_token(&self, user: &User) -> Result<String, AppError> {
        let expires_at = DateTime::parse_from_rfc3339(&user.token_expires_at)
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "Failed to parse token expiry for athlete {}: {}",
                    user.strava_athlete_id,
                    e
                ))
            })?
            .with_timezone(&Utc);

        if !needs_refresh(expires_at, Utc::now()) {
            return Ok(user.access_token.clone());
        }

        tracing::info!(
            athlete_id = user.strava_athlete_id,
            "Access token expiring, refreshing"
        );

        let new_tokens = self.client.refresh_token(&user.refresh_token).await?;

        let new_expires_at = DateTime::from_timestamp(new_tokens.expires_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        // Persist before use: the store must never hold a stale token
        // that we are already calling Strava with.
        let updated = User {
            access_token: new_tokens.access_token.clone(),
            refresh_token: new_tokens.refresh_token.clone(),
            token_expires_at: new_expires_at,
            ..user.clone()
        };
        self.db.upsert_user(&updated).await?;

        tracing::info!(
            athlete_id = user.strava_athlete_id,
            "Token refreshed and stored"
        );
        Ok(new_tokens.access_token)
    }

    // ─── OAuth Setup ─────────────────────────────────────────────────────────

    /// Build the Strava authorization URL for the OAuth start redirect.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, AppError> {
        if self.client.client_id.is_empty() {
            return Err(AppError::Configuration(
                "Strava client ID is not configured".to_string(),
            ));
        }

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            STRAVA_AUTH_URL,
            self.client.client_id,
            urlencoding::encode(redirect_uri),
            OAUTH_SCOPE,
            state
        ))
    }

    /// Handle OAuth callback: exchange code for tokens and upsert the
    /// user record (last OAuth completion wins).
    pub async fn handle_oauth_callback(
        &self,
        code: &str,
        telegram_chat_id: Option<String>,
    ) -> Result<User, AppError> {
        let token_response = self.client.exchange_code(code).await?;

        let expires_at = DateTime::from_timestamp(token_response.expires_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        let user = User {
            strava_athlete_id: token_response.athlete.id,
            nickname: token_response.athlete.nickname(),
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            token_expires_at: expires_at,
            telegram_chat_id,
            created_at: Utc::now().to_rfc3339(),
        };

        self.db.upsert_user(&user).await?;

        tracing::info!(
            athlete_id = user.strava_athlete_id,
            nickname = %user.nickname,
            "OAuth callback handled, user and tokens stored"
        );

        Ok(user)
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity, AppError> {
        self.client.get_activity(access_token, activity_id).await
    }

    /// Update an activity's description.
    pub async fn update_activity_description(
        &self,
        access_token: &str,
        activity_id: u64,
        description: &str,
    ) -> Result<(), AppError> {
        self.client
            .update_activity_description(access_token, activity_id, description)
            .await
    }
}
