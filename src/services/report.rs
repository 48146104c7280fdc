// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fat Burn Report rendering and description merge logic.
//!
//! The report block is framed by a divider glyph and carries a header
//! phrase; together they are the sentinel used to detect and replace a
//! previously inserted report without clobbering user-authored text.

use crate::services::foods::Food;
use crate::services::metrics::DerivedMetrics;

/// Header phrase used to detect an existing report.
pub const REPORT_HEADER: &str = "🔥 Fat Burn Report";

/// Divider glyph framing the report block.
pub const REPORT_DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━";

/// Render the fixed-format report block.
pub fn build_report(metrics: &DerivedMetrics, food: &Food) -> String {
    format!(
        "{divider}\n\
         {header}\n\
         {divider}\n\
         \n\
         📏 {distance:.1}km | ⏱️ {duration}min\n\
         🔥 {calories}kcal burned\n\
         \n\
         {emoji} {fat}g of body fat gone!\n   \
         ≈ that's {food} burned off!\n\
         \n\
         {divider}",
        divider = REPORT_DIVIDER,
        header = REPORT_HEADER,
        distance = metrics.distance_km,
        duration = metrics.duration_min,
        calories = metrics.calories,
        emoji = food.emoji,
        fat = metrics.fat_burned_grams,
        food = food.name,
    )
}

/// True if the text already contains a report (idempotency guard).
pub fn contains_report(text: &str) -> bool {
    text.contains(REPORT_HEADER)
}

/// Merge a new report into an existing description.
///
/// - Empty/blank existing: the report verbatim.
/// - Existing report present: everything before the first divider is
///   user-authored preamble and is kept (trimmed); the old report and
///   anything after it is replaced.
/// - No report present: the report is appended below the existing text,
///   separated by a blank line.
///
/// Idempotent: re-merging the same report yields the same text.
pub fn merge_description(existing: Option<&str>, new_report: &str) -> String {
    let existing = match existing {
        Some(text) if !text.trim().is_empty() => text,
        _ => return new_report.to_string(),
    };

    if existing.contains(REPORT_HEADER) {
        if let Some(report_start) = existing.find(REPORT_DIVIDER) {
            let preamble = existing[..report_start].trim();
            if preamble.is_empty() {
                return new_report.to_string();
            }
            return format!("{}\n\n{}", preamble, new_report);
        }
    }

    format!("{}\n\n{}", existing.trim(), new_report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> String {
        let metrics = DerivedMetrics::derive(5000.0, 1800, Some(320.0));
        let food = Food {
            emoji: "🍩".to_string(),
            name: "a glazed donut".to_string(),
        };
        build_report(&metrics, &food)
    }

    #[test]
    fn test_build_report_carries_sentinel() {
        let report = sample_report();
        assert!(contains_report(&report));
        assert!(report.starts_with(REPORT_DIVIDER));
        assert!(report.ends_with(REPORT_DIVIDER));
    }

    #[test]
    fn test_build_report_formats_metrics() {
        let report = sample_report();
        assert!(report.contains("📏 5.0km | ⏱️ 30min"));
        assert!(report.contains("🔥 320kcal burned"));
        assert!(report.contains("🍩 41.56g of body fat gone!"));
        assert!(report.contains("a glazed donut"));
    }

    #[test]
    fn test_build_report_keeps_fractional_calories() {
        // Strava reports observed calories with a fractional part; the
        // report carries the value as-is rather than rounding it away.
        let metrics = DerivedMetrics::derive(5000.0, 1800, Some(320.2));
        let food = Food {
            emoji: "🍩".to_string(),
            name: "a glazed donut".to_string(),
        };
        let report = build_report(&metrics, &food);
        assert!(report.contains("🔥 320.2kcal burned"));
    }

    #[test]
    fn test_merge_into_empty() {
        assert_eq!(merge_description(None, "R"), "R");
        assert_eq!(merge_description(Some(""), "R"), "R");
        assert_eq!(merge_description(Some("   "), "R"), "R");
    }

    #[test]
    fn test_merge_appends_below_user_text() {
        assert_eq!(merge_description(Some("user note"), "R"), "user note\n\nR");
    }

    #[test]
    fn test_merge_replaces_old_report_keeps_preamble() {
        let report = sample_report();
        let existing = format!("pre\n\n{}", report);
        let merged = merge_description(Some(&existing), "R");
        assert_eq!(merged, "pre\n\nR");
    }

    #[test]
    fn test_merge_discards_text_after_old_report() {
        let report = sample_report();
        let existing = format!("pre\n\n{}\ntrailing junk", report);
        let merged = merge_description(Some(&existing), "R");
        assert_eq!(merged, "pre\n\nR");
    }

    #[test]
    fn test_merge_replaces_report_with_no_preamble() {
        let report = sample_report();
        let merged = merge_description(Some(&report), "R");
        assert_eq!(merged, "R");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let report = sample_report();
        for existing in [
            None,
            Some(""),
            Some("user note"),
            Some("user note "),
            Some("line one\nline two"),
        ] {
            let once = merge_description(existing, &report);
            let twice = merge_description(Some(&once), &report);
            assert_eq!(once, twice);
        }
    }
}
