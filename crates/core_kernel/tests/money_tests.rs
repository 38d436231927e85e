//! Integration tests for the Money type public API

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

#[test]
fn money_display_uses_currency_symbol() {
    let m = Money::new(dec!(1234.5), Currency::USD);
    assert_eq!(m.to_string(), "$ 1234.50");

    let m = Money::new(dec!(99), Currency::GBP);
    assert_eq!(m.to_string(), "£ 99.00");
}

#[test]
fn zero_is_neither_positive_nor_negative() {
    let zero = Money::zero(Currency::USD);
    assert!(zero.is_zero());
    assert!(!zero.is_positive());
    assert!(!zero.is_negative());
}

#[test]
fn checked_sub_can_go_negative() {
    let paid = Money::new(dec!(600), Currency::USD);
    let claimed = Money::new(dec!(1000), Currency::USD);

    let remaining = claimed.checked_sub(&paid).unwrap();
    assert_eq!(remaining.amount(), dec!(400));

    let overdrawn = paid.checked_sub(&claimed).unwrap();
    assert!(overdrawn.is_negative());
}

#[test]
fn divide_by_zero_is_an_error() {
    let m = Money::new(dec!(100), Currency::USD);
    assert_eq!(m.divide(dec!(0)), Err(MoneyError::DivisionByZero));
}

#[test]
fn allocation_of_uneven_amount_distributes_remainder_first() {
    let m = Money::new(dec!(100.00), Currency::USD);
    let parts = m.allocate(3).unwrap();

    assert_eq!(parts[0].amount(), dec!(33.34));
    assert_eq!(parts[1].amount(), dec!(33.33));
    assert_eq!(parts[2].amount(), dec!(33.33));
}

#[test]
fn rate_round_trip() {
    let rate = Rate::from_percentage(dec!(7.25));
    assert_eq!(rate.as_decimal(), dec!(0.0725));
    assert_eq!(rate.as_percentage(), dec!(7.25));
}

#[test]
fn bankers_rounding_rounds_half_to_even() {
    let m = Money::new(dec!(10.125), Currency::USD);
    assert_eq!(m.round_bankers(2).amount(), dec!(10.12));

    let m = Money::new(dec!(10.135), Currency::USD);
    assert_eq!(m.round_bankers(2).amount(), dec!(10.14));
}
