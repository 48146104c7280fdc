// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity processing service.
//!
//! Handles the core workflow for one activity-created event:
//! 1. Resolve the stored user by athlete ID
//! 2. Refresh the access token if expiring (persisted before use)
//! 3. Fetch activity detail from Strava
//! 4. Skip if a Fat Burn Report is already present (redelivery)
//! 5. Derive calories / fat-burn metrics, match a food
//! 6. Merge the report into the description and write it back

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::services::foods::FoodCatalog;
use crate::services::metrics::DerivedMetrics;
use crate::services::report;
use crate::services::strava::StravaService;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Processes one activity-created event end to end.
pub struct ActivityProcessor {
    strava: StravaService,
    foods: FoodCatalog,
    db: FirestoreDb,
}

/// Outcome of processing an event, for logging.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Description updated with a new report.
    Patched,
    /// User never completed OAuth setup (or revoked).
    UserNotFound,
    /// Description already carries a report (redelivered event).
    AlreadyReported,
    /// No calories observed and none derivable from distance.
    NoCalorieData,
}

impl ActivityProcessor {
    pub fn new(strava: StravaService, foods: FoodCatalog, db: FirestoreDb) -> Self {
        Self { strava, foods, db }
    }

    /// Process an activity-created event.
    ///
    /// Runs detached from the webhook response; errors propagate to the
    /// task boundary where they are logged, never to the deliverer.
    pub async fn process_activity(
        &self,
        athlete_id: u64,
        activity_id: u64,
    ) -> Result<ProcessOutcome> {
        tracing::info!(athlete_id, activity_id, "Processing activity");

        // 1. Resolve the user. Missing record means setup was never
        //    completed (or access was revoked): stop silently.
        let user = match self.db.get_user(athlete_id).await? {
            Some(user) => user,
            None => {
                tracing::info!(athlete_id, "No stored user for event, skipping");
                return Ok(ProcessOutcome::UserNotFound);
            }
        };

        // 2. Ensure a valid token (refresh + persist happens inside).
        let access_token = self.strava.valid_access_token(&user).await?;

        // 3. Fetch activity detail.
        let activity = self.strava.get_activity(&access_token, activity_id).await?;

        // 4. Idempotency guard: a redelivered event must not produce a
        //    second PUT once the report is in place.
        if activity
            .description
            .as_deref()
            .is_some_and(report::contains_report)
        {
            tracing::info!(athlete_id, activity_id, "Report already present, skipping");
            return Ok(ProcessOutcome::AlreadyReported);
        }

        // 5. Derive metrics; with no calories and no distance there is
        //    nothing meaningful to report.
        let metrics =
            DerivedMetrics::derive(activity.distance, activity.moving_time, activity.calories);
        if metrics.calories <= 0.0 {
            tracing::info!(athlete_id, activity_id, "No calorie data, skipping");
            return Ok(ProcessOutcome::NoCalorieData);
        }

        let mut rng = StdRng::from_entropy();
        let food = self.foods.match_food(metrics.fat_burned_grams, &mut rng);

        // 6. Merge and write back.
        let new_report = report::build_report(&metrics, food);
        let description = report::merge_description(activity.description.as_deref(), &new_report);

        self.strava
            .update_activity_description(&access_token, activity_id, &description)
            .await?;

        tracing::info!(
            athlete_id,
            activity_id,
            activity_name = %activity.name,
            calories = metrics.calories,
            fat_burned_grams = metrics.fat_burned_grams,
            "Fat Burn Report written to activity"
        );

        Ok(ProcessOutcome::Patched)
    }
}
