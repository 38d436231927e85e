//! Policy aggregate integration tests

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PeriodError, PolicyPeriod, UserId};
use domain_policy::{
    Coverage, CoverageType, Endorsement, PolicyBuilder, PolicyError, PolicyStatus,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn liability_coverage() -> Coverage {
    Coverage::new(
        CoverageType::PersonalLiability,
        usd(dec!(1_000_000)),
        usd(dec!(250)),
        usd(dec!(380)),
    )
    .unwrap()
}

#[test]
fn one_year_span_enforced_from_tomorrow() {
    // Spec scenario: effective tomorrow, expiry +366 days, must be rejected
    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let result = PolicyPeriod::new(tomorrow, tomorrow + Duration::days(366));
    assert!(matches!(result, Err(PeriodError::TermTooLong { .. })));
}

#[test]
fn created_policy_reads_back_identically() {
    let owner = UserId::new();
    let period = PolicyPeriod::new(d(2025, 4, 1), d(2026, 4, 1)).unwrap();

    let policy = PolicyBuilder::new()
        .policy_number("UMB-202504-000123")
        .owner(owner)
        .period(period)
        .add_coverage(liability_coverage())
        .build()
        .unwrap();

    assert_eq!(policy.status(), PolicyStatus::Draft);
    assert_eq!(policy.policy_number(), "UMB-202504-000123");
    assert_eq!(policy.owner_id(), owner);
    assert_eq!(policy.period(), period);
    assert_eq!(policy.coverages().len(), 1);
}

#[test]
fn full_lifecycle_draft_to_terminated() {
    let mut policy = PolicyBuilder::new()
        .owner(UserId::new())
        .period(PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap())
        .add_coverage(liability_coverage())
        .build()
        .unwrap();

    policy.activate().unwrap();

    let endorsement = Endorsement::new(
        "Add second residence",
        usd(dec!(95)),
        PolicyPeriod::new(d(2025, 2, 1), d(2025, 12, 31)).unwrap(),
    );
    let endorsement_id = endorsement.id;
    policy.add_endorsement(endorsement).unwrap();
    policy
        .approve_endorsement(endorsement_id, "mgr.okafor")
        .unwrap();

    let statement = policy.premium().unwrap();
    assert_eq!(statement.coverage_total.amount(), dec!(380));
    assert_eq!(statement.endorsement_adjustment.amount(), dec!(95));
    assert_eq!(statement.total.amount(), dec!(475));

    policy.terminate(d(2025, 8, 15)).unwrap();
    assert_eq!(policy.status(), PolicyStatus::Terminated);
    assert_eq!(policy.period().expiry_date(), d(2025, 8, 15));

    // Terminal: no further transitions or edits
    assert!(policy.activate().is_err());
    assert!(policy.add_coverage(liability_coverage()).is_err());
}

#[test]
fn shrinking_period_under_approved_endorsement_rejected() {
    let mut policy = PolicyBuilder::new()
        .owner(UserId::new())
        .period(PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap())
        .build()
        .unwrap();
    policy.activate().unwrap();

    let endorsement = Endorsement::new(
        "late-term change",
        usd(dec!(60)),
        PolicyPeriod::new(d(2025, 9, 1), d(2025, 12, 1)).unwrap(),
    );
    let endorsement_id = endorsement.id;
    policy.add_endorsement(endorsement).unwrap();
    policy.approve_endorsement(endorsement_id, "mgr").unwrap();

    let shorter = PolicyPeriod::new(d(2025, 1, 1), d(2025, 6, 30)).unwrap();
    let result = policy.update_details(Some(shorter), None);
    assert!(matches!(
        result,
        Err(PolicyError::EndorsementOutsidePolicyPeriod)
    ));
}

#[test]
fn currency_mismatch_on_coverage_rejected() {
    let mut policy = PolicyBuilder::new()
        .owner(UserId::new())
        .period(PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap())
        .build()
        .unwrap();

    let gbp_coverage = Coverage::new(
        CoverageType::ExcessHome,
        Money::new(dec!(500_000), Currency::GBP),
        Money::new(dec!(0), Currency::GBP),
        Money::new(dec!(200), Currency::GBP),
    )
    .unwrap();

    assert!(matches!(
        policy.add_coverage(gbp_coverage),
        Err(PolicyError::CurrencyMismatch { .. })
    ));
}
