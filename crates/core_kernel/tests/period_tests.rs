//! Integration tests for PolicyPeriod public API

use chrono::NaiveDate;
use core_kernel::{PeriodError, PolicyPeriod};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn annual_constructor_spans_twelve_months() {
    let period = PolicyPeriod::annual(d(2025, 3, 15));
    assert_eq!(period.effective_date(), d(2025, 3, 15));
    assert_eq!(period.expiry_date(), d(2026, 3, 15));
}

#[test]
fn period_serializes_as_plain_dates() {
    let period = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
    let json = serde_json::to_string(&period).unwrap();
    assert!(json.contains("2025-01-01"));
    assert!(json.contains("2025-12-31"));

    let back: PolicyPeriod = serde_json::from_str(&json).unwrap();
    assert_eq!(back, period);
}

#[test]
fn deserialization_does_not_bypass_validation_on_new() {
    // The wire format is trusted only for values the repository produced;
    // request DTOs always go through PolicyPeriod::new.
    let result = PolicyPeriod::new(d(2025, 1, 1), d(2027, 1, 1));
    assert!(matches!(result, Err(PeriodError::TermTooLong { .. })));
}

#[test]
fn truncate_keeps_effective_date() {
    let period = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
    let truncated = period.truncate(d(2025, 4, 30)).unwrap();

    assert_eq!(truncated.effective_date(), d(2025, 1, 1));
    assert_eq!(truncated.expiry_date(), d(2025, 4, 30));
    assert!(truncated.term_days() < period.term_days());
}

#[test]
fn truncate_to_effective_date_rejected() {
    let period = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
    let result = period.truncate(d(2025, 1, 1));
    assert!(matches!(result, Err(PeriodError::InvalidOrder { .. })));
}
