// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tiered food catalog: maps grams of fat burned to a comparable food.

use crate::error::AppError;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One food item shown in the report.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Food {
    pub emoji: String,
    pub name: String,
}

/// A tier of foods, selected when fat burned is at or below `max_grams`.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodTier {
    pub max_grams: f64,
    pub foods: Vec<Food>,
}

#[derive(Deserialize)]
struct FoodsFile {
    tiers: Vec<FoodTier>,
}

/// Food catalog loaded once at startup.
///
/// Construction validates the table, so a catalog always has at least
/// one tier and every tier has at least one food.
#[derive(Clone)]
pub struct FoodCatalog {
    tiers: Vec<FoodTier>,
}

impl FoodCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let json_data = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read food table {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, AppError> {
        let parsed: FoodsFile = serde_json::from_str(json_data)
            .map_err(|e| AppError::Configuration(format!("Failed to parse food table: {}", e)))?;

        if parsed.tiers.is_empty() {
            return Err(AppError::Configuration(
                "Food table has no tiers".to_string(),
            ));
        }
        for tier in &parsed.tiers {
            if tier.foods.is_empty() {
                return Err(AppError::Configuration(format!(
                    "Food tier (max {}g) has no foods",
                    tier.max_grams
                )));
            }
        }

        tracing::info!(tiers = parsed.tiers.len(), "Loaded food table");
        Ok(Self {
            tiers: parsed.tiers,
        })
    }

    /// Get the tier list.
    pub fn tiers(&self) -> &[FoodTier] {
        &self.tiers
    }

    /// Find the tier for a fat-burn amount: first tier whose bound is at
    /// or above `grams` (tiers are in ascending-bound order), falling
    /// back to the last tier for anything exceeding every bound.
    pub fn tier_for(&self, grams: f64) -> &FoodTier {
        self.tiers
            .iter()
            .find(|t| grams <= t.max_grams)
            .unwrap_or_else(|| &self.tiers[self.tiers.len() - 1])
    }

    /// Pick a food for a fat-burn amount, uniformly at random within the
    /// matching tier. The RNG is injected so tests can seed it.
    pub fn match_food<R: Rng>(&self, grams: f64, rng: &mut R) -> &Food {
        let tier = self.tier_for(grams);
        &tier.foods[rng.gen_range(0..tier.foods.len())]
    }
}
