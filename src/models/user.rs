//! User model for storage.

use serde::{Deserialize, Serialize};

/// User record stored in Firestore (one document per Strava athlete).
///
/// Created on OAuth completion (last OAuth wins on conflict); the token
/// fields are rewritten on every refresh. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Strava athlete ID (also used as document ID)
    pub strava_athlete_id: u64,
    /// Display nickname (Strava username, or first + last name)
    pub nickname: String,
    /// OAuth access token
    pub access_token: String,
    /// OAuth refresh token
    pub refresh_token: String,
    /// When the access token expires (ISO 8601)
    pub token_expires_at: String,
    /// Telegram chat ID captured during OAuth setup, if any
    pub telegram_chat_id: Option<String>,
    /// When the user first connected
    pub created_at: String,
}
