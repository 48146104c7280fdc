// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie and fat-burn conversions.
//!
//! Pure functions: no side effects, no failure modes. Negative inputs
//! are not validated and are the caller's responsibility.

/// Energy density of adipose tissue: ~7700 kcal per kg.
const KCAL_PER_KG_FAT: f64 = 7700.0;

/// Flat estimate used when Strava reports no calories: ~60 kcal per km.
const KCAL_PER_KM: f64 = 60.0;

/// Convert calories burned to grams of body fat, rounded to 2 decimals
/// (half up on the cents-equivalent).
pub fn fat_burn_grams(calories: f64) -> f64 {
    (calories / KCAL_PER_KG_FAT * 1000.0 * 100.0).round() / 100.0
}

/// Estimate calories burned from distance alone.
pub fn estimate_calories(distance_meters: f64) -> f64 {
    (distance_meters / 1000.0 * KCAL_PER_KM).round()
}

/// Metrics derived from one activity. Computed per event, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    /// Calories burned: observed if Strava reported a positive figure,
    /// otherwise distance-estimated.
    pub calories: f64,
    /// Estimated grams of body fat burned.
    pub fat_burned_grams: f64,
    pub distance_km: f64,
    pub duration_min: i64,
}

impl DerivedMetrics {
    pub fn derive(distance_meters: f64, moving_time_secs: u64, calories: Option<f64>) -> Self {
        let calories = match calories {
            Some(c) if c > 0.0 => c,
            _ => estimate_calories(distance_meters),
        };

        Self {
            calories,
            fat_burned_grams: fat_burn_grams(calories),
            distance_km: distance_meters / 1000.0,
            duration_min: (moving_time_secs as f64 / 60.0).round() as i64,
        }
    }
}
