//! Application configuration loaded from environment variables.
//!
//! All configuration is read once at startup into an explicit struct and
//! passed by reference through `AppState`; business logic never does
//! ambient environment lookups.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Webhook subscription verification token
    pub webhook_verify_token: String,
    /// Key used to HMAC-sign the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
    /// Public base URL of this service (for redirect URIs and the
    /// webhook callback URL)
    pub public_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Path to the tiered food table
    pub foods_path: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            webhook_verify_token: env::var("WEBHOOK_VERIFY_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_VERIFY_TOKEN"))?,
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            foods_path: env::var("FOODS_PATH").unwrap_or_else(|_| "data/foods.json".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            webhook_verify_token: "test_verify_token".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            public_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            foods_path: "data/foods.json".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", "test_secret");
        env::set_var("WEBHOOK_VERIFY_TOKEN", "test_verify");
        env::set_var("OAUTH_STATE_KEY", "test_state_key_32_bytes_minimum!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.webhook_verify_token, "test_verify");
        assert_eq!(config.port, 8080);
    }
}
