//! Pre-built test fixtures
//!
//! Fixed, predictable values for unit tests. Anything random lives in
//! `generators`; anything configurable lives in `builders`.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, Money, PolicyId, PolicyPeriod, UserId};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard annual umbrella premium
    pub fn usd_premium() -> Money {
        Money::new(dec!(425.00), Currency::USD)
    }

    /// A one-million-dollar liability limit
    pub fn usd_limit() -> Money {
        Money::new(dec!(1_000_000.00), Currency::USD)
    }

    /// A typical claimed amount
    pub fn usd_claim() -> Money {
        Money::new(dec!(1000.00), Currency::USD)
    }

    /// A zero USD amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A CAD amount for currency-mismatch tests
    pub fn cad_100() -> Money {
        Money::new(dec!(100.00), Currency::CAD)
    }
}

/// Fixture for policy period test data
pub struct PeriodFixtures;

impl PeriodFixtures {
    /// Standard calendar-year 2025 period
    pub fn calendar_2025() -> PolicyPeriod {
        PolicyPeriod::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    /// Mid-term date inside the calendar-2025 period
    pub fn mid_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    /// A date after the calendar-2025 period ends
    pub fn after_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    /// Standard incident date for claim tests
    pub fn incident_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// Standard reported date (five days after the incident)
    pub fn reported_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A deterministic policy id
    pub fn policy_id() -> PolicyId {
        PolicyId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// A deterministic claim id
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// A deterministic user id
    pub fn user_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A well-formed policy number
    pub fn policy_number() -> &'static str {
        "UMB-202501-000042"
    }

    /// A well-formed claim number
    pub fn claim_number() -> &'static str {
        "CLM-8844213007"
    }

    /// A well-formed SpeedPay transaction id
    pub fn transaction_id() -> &'static str {
        "SP-20250315-00917"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_fixtures_are_consistent() {
        let period = PeriodFixtures::calendar_2025();
        assert!(period.contains(PeriodFixtures::mid_2025()));
        assert!(!period.contains(PeriodFixtures::after_2025()));
        assert!(PeriodFixtures::incident_date() <= PeriodFixtures::reported_date());
    }

    #[test]
    fn test_money_fixtures() {
        assert!(MoneyFixtures::usd_premium().is_positive());
        assert!(MoneyFixtures::usd_zero().is_zero());
        assert_ne!(
            MoneyFixtures::cad_100().currency(),
            MoneyFixtures::usd_premium().currency()
        );
    }
}
