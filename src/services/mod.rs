// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod foods;
pub mod metrics;
pub mod report;
pub mod strava;

pub use activity::{ActivityProcessor, ProcessOutcome};
pub use foods::FoodCatalog;
pub use strava::{StravaClient, StravaService};
