//! Premium derivation
//!
//! A policy's total premium is never stored: it is recomputed from the rated
//! coverages plus the adjustments of approved endorsements, so edits to
//! either can never leave a stale total behind.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};
use crate::coverage::Coverage;
use crate::endorsement::Endorsement;
use crate::error::PolicyError;

/// Breakdown of a policy's derived premium
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumStatement {
    /// Sum of rated coverage premiums
    pub coverage_total: Money,
    /// Net adjustment from approved endorsements
    pub endorsement_adjustment: Money,
    /// Total premium (coverage total + endorsement adjustment)
    pub total: Money,
}

/// Derives the premium for a set of coverages and endorsements
///
/// Inactive coverages and non-approved endorsements contribute nothing.
///
/// # Errors
///
/// Returns an error if any component amount is in a different currency than
/// the policy.
pub fn derive_premium(
    currency: Currency,
    coverages: &[Coverage],
    endorsements: &[Endorsement],
) -> Result<PremiumStatement, PolicyError> {
    let mut coverage_total = Money::zero(currency);
    for coverage in coverages.iter().filter(|c| c.is_rated()) {
        coverage_total = coverage_total.checked_add(&coverage.premium)?;
    }

    let mut endorsement_adjustment = Money::zero(currency);
    for endorsement in endorsements.iter().filter(|e| e.is_rated()) {
        endorsement_adjustment =
            endorsement_adjustment.checked_add(&endorsement.premium_adjustment)?;
    }

    let total = coverage_total.checked_add(&endorsement_adjustment)?;

    Ok(PremiumStatement {
        coverage_total,
        endorsement_adjustment,
        total,
    })
}

/// Splits a total premium into n billing installments
///
/// The remainder lands on the earliest installments so the schedule sums
/// exactly to the total.
pub fn installments(total: Money, n: u32) -> Result<Vec<Money>, PolicyError> {
    Ok(total.allocate(n)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageType;
    use chrono::NaiveDate;
    use core_kernel::PolicyPeriod;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn period() -> PolicyPeriod {
        PolicyPeriod::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn coverage(premium: rust_decimal::Decimal) -> Coverage {
        Coverage::new(
            CoverageType::PersonalLiability,
            usd(dec!(1_000_000)),
            usd(dec!(0)),
            usd(premium),
        )
        .unwrap()
    }

    #[test]
    fn test_premium_sums_rated_coverages() {
        let coverages = vec![coverage(dec!(300)), coverage(dec!(150))];
        let statement = derive_premium(Currency::USD, &coverages, &[]).unwrap();

        assert_eq!(statement.coverage_total.amount(), dec!(450));
        assert_eq!(statement.total.amount(), dec!(450));
    }

    #[test]
    fn test_inactive_coverage_excluded() {
        let mut inactive = coverage(dec!(200));
        inactive.deactivate();
        let coverages = vec![coverage(dec!(300)), inactive];

        let statement = derive_premium(Currency::USD, &coverages, &[]).unwrap();
        assert_eq!(statement.total.amount(), dec!(300));
    }

    #[test]
    fn test_only_approved_endorsements_count() {
        let coverages = vec![coverage(dec!(500))];

        let mut approved = Endorsement::new("add exposure", usd(dec!(75)), period());
        approved.approve("mgr").unwrap();
        let draft = Endorsement::new("pending change", usd(dec!(999)), period());

        let statement =
            derive_premium(Currency::USD, &coverages, &[approved, draft]).unwrap();

        assert_eq!(statement.endorsement_adjustment.amount(), dec!(75));
        assert_eq!(statement.total.amount(), dec!(575));
    }

    #[test]
    fn test_return_premium_endorsement_reduces_total() {
        let coverages = vec![coverage(dec!(500))];
        let mut endorsement = Endorsement::new("remove vehicle", usd(dec!(-120)), period());
        endorsement.approve("mgr").unwrap();

        let statement = derive_premium(Currency::USD, &coverages, &[endorsement]).unwrap();
        assert_eq!(statement.total.amount(), dec!(380));
    }

    #[test]
    fn test_installment_schedule_sums_to_total() {
        let total = usd(dec!(577.00));
        let schedule = installments(total, 12).unwrap();

        assert_eq!(schedule.len(), 12);
        let sum: Money = schedule
            .into_iter()
            .fold(Money::zero(Currency::USD), |acc, p| acc + p);
        assert_eq!(sum, total);
    }
}
