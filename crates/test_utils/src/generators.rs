//! Property-based test generators
//!
//! Proptest strategies that generate random values while maintaining
//! domain invariants (valid periods, paid never above claimed, etc.).

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, PolicyPeriod};

/// Strategy for generating supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::CAD),
        Just(Currency::EUR),
        Just(Currency::GBP),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for positive USD Money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for valid policy periods (1 to 365 days, starting 1990-2040)
pub fn policy_period_strategy() -> impl Strategy<Value = PolicyPeriod> {
    (0i64..18_250i64, 1i64..365i64).prop_map(|(start_offset, term)| {
        let effective = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(start_offset);
        PolicyPeriod::new(effective, effective + Duration::days(term))
            .expect("generated period within bounds")
    })
}

/// Strategy for (claimed, paid) amount pairs with paid <= claimed
pub fn claim_paid_pair_strategy() -> impl Strategy<Value = (Money, Money)> {
    (1i64..1_000_000_000i64)
        .prop_flat_map(|claimed| (Just(claimed), 0i64..=claimed))
        .prop_map(|(claimed, paid)| {
            (
                Money::from_minor(claimed, Currency::USD),
                Money::from_minor(paid, Currency::USD),
            )
        })
}

/// Strategy for rate decimals between 0 and 1
pub fn rate_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..10_000u32).prop_map(|n| Decimal::new(n as i64, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_periods_hold_invariants(period in policy_period_strategy()) {
            prop_assert!(period.effective_date() < period.expiry_date());
            prop_assert!(period.term_days() <= 365);
        }

        #[test]
        fn generated_claim_pairs_hold_bound((claimed, paid) in claim_paid_pair_strategy()) {
            prop_assert!(paid.amount() <= claimed.amount());
            prop_assert!(claimed.is_positive());
        }
    }
}
