//! Custom test assertions
//!
//! Assertion helpers for domain types that give more meaningful error
//! messages than bare assert_eq.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_claims::Claim;

/// Asserts that two Money values are equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies differ or the amounts differ by more than the
/// tolerance.
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is strictly positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {}",
        money
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts the claim's paid-versus-claimed invariant
pub fn assert_claim_amounts_consistent(claim: &Claim) {
    assert!(
        !claim.paid_amount.is_negative(),
        "Claim {} has negative paid amount {}",
        claim.claim_number,
        claim.paid_amount
    );
    assert!(
        claim.paid_amount.amount() <= claim.claim_amount.amount(),
        "Claim {} paid {} exceeds claimed {}",
        claim.claim_number,
        claim.paid_amount,
        claim.claim_amount
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TestClaimBuilder;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_approx_eq_within_tolerance() {
        let a = Money::new(dec!(100.004), Currency::USD);
        let b = Money::new(dec!(100.000), Currency::USD);
        assert_money_approx_eq(&a, &b, dec!(0.01));
    }

    #[test]
    #[should_panic]
    fn test_approx_eq_outside_tolerance_panics() {
        let a = Money::new(dec!(101.00), Currency::USD);
        let b = Money::new(dec!(100.00), Currency::USD);
        assert_money_approx_eq(&a, &b, dec!(0.01));
    }

    #[test]
    fn test_claim_invariant_assertion() {
        let claim = TestClaimBuilder::new().build();
        assert_claim_amounts_consistent(&claim);
    }
}
