// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Description merge behavior across realistic report lifecycles.

use fatburn_relay::services::foods::Food;
use fatburn_relay::services::metrics::DerivedMetrics;
use fatburn_relay::services::report::{build_report, contains_report, merge_description};

fn report_for(calories: f64) -> String {
    let metrics = DerivedMetrics::derive(5000.0, 1800, Some(calories));
    let food = Food {
        emoji: "🍩".to_string(),
        name: "a glazed donut".to_string(),
    };
    build_report(&metrics, &food)
}

#[test]
fn test_fresh_activity_gets_report_verbatim() {
    let report = report_for(320.0);
    assert_eq!(merge_description(None, &report), report);
}

#[test]
fn test_user_note_is_preserved_above_report() {
    let report = report_for(320.0);
    let merged = merge_description(Some("Morning run, felt great"), &report);

    assert!(merged.starts_with("Morning run, felt great\n\n"));
    assert!(merged.ends_with(&report));
}

#[test]
fn test_redelivered_report_is_replaced_not_appended() {
    let first = report_for(320.0);
    let second = report_for(500.0);

    let after_first = merge_description(Some("Morning run"), &first);
    let after_second = merge_description(Some(&after_first), &second);

    assert!(after_second.starts_with("Morning run\n\n"));
    assert!(after_second.contains("500kcal"));
    assert!(!after_second.contains("320kcal"), "old report must be gone");
    // Exactly one report block survives
    assert_eq!(after_second.matches("Fat Burn Report").count(), 1);
}

#[test]
fn test_merge_idempotent_over_assorted_descriptions() {
    let report = report_for(320.0);
    let old_report = report_for(500.0);

    let cases = [
        None,
        Some(""),
        Some("   \n  "),
        Some("short note"),
        Some("multi\nline\nnote"),
        Some("note with trailing space "),
    ];

    for existing in cases {
        let once = merge_description(existing, &report);
        let twice = merge_description(Some(&once), &report);
        assert_eq!(once, twice, "not idempotent for {:?}", existing);
    }

    // Also idempotent starting from a description that already has an
    // older report below a preamble.
    let seeded = merge_description(Some("preamble"), &old_report);
    let once = merge_description(Some(&seeded), &report);
    let twice = merge_description(Some(&once), &report);
    assert_eq!(once, twice);
}

#[test]
fn test_contains_report_is_the_redelivery_guard() {
    let report = report_for(320.0);

    assert!(!contains_report("Morning run, felt great"));
    assert!(contains_report(&merge_description(
        Some("Morning run"),
        &report
    )));
}
