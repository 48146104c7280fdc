// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! The relay stores a single `users` collection keyed by Strava athlete
//! ID, holding the OAuth tokens and the optional Telegram chat ID.

use crate::db::collections;
use crate::error::AppError;
use crate::models::User;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Cloud(firestore::FirestoreDb),
    /// In-memory user map, shared across clones.
    Memory(Arc<Mutex<HashMap<u64, User>>>),
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Cloud(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Cloud(client),
        })
    }

    /// Create an in-memory client for testing (no GCP connection).
    ///
    /// Starts empty; clones share the same map.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Strava athlete ID.
    pub async fn get_user(&self, athlete_id: u64) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Cloud(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(&athlete_id.to_string())
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(users) => {
                let users = users
                    .lock()
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(users.get(&athlete_id).cloned())
            }
        }
    }

    /// Create or update a user (last write wins).
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Cloud(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(user.strava_athlete_id.to_string())
                    .object(user)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(users) => {
                let mut users = users
                    .lock()
                    .map_err(|e| AppError::Database(e.to_string()))?;
                users.insert(user.strava_athlete_id, user.clone());
                Ok(())
            }
        }
    }
}
