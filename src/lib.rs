// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FatBurn Relay: annotate Strava activities with a Fat Burn Report
//!
//! This crate receives Strava activity-created webhook events, converts
//! the activity's calories into an estimated body-fat burn, matches it
//! to a comparable food, and writes the report back into the activity
//! description.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{FoodCatalog, StravaService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub strava: StravaService,
    pub foods: FoodCatalog,
}
