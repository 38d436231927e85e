//! Policy period handling
//!
//! An umbrella policy is written for a fixed term: the effective date must
//! precede the expiry date, and the term may not exceed one year. The
//! `PolicyPeriod` type enforces both rules at construction so no other layer
//! needs to re-check them.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum policy term, expressed in calendar months
pub const MAX_TERM_MONTHS: u32 = 12;

/// Errors related to policy period validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period: effective date {effective} must be before expiry date {expiry}")]
    InvalidOrder {
        effective: NaiveDate,
        expiry: NaiveDate,
    },

    #[error("Policy term exceeds {MAX_TERM_MONTHS} months: {effective} to {expiry}")]
    TermTooLong {
        effective: NaiveDate,
        expiry: NaiveDate,
    },

    #[error("Date {date} falls outside the policy period")]
    OutOfPeriod { date: NaiveDate },
}

/// The in-force window of a policy
///
/// Invariants held by construction:
/// - `effective_date < expiry_date`
/// - `expiry_date <= effective_date + 12 months`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPeriod {
    effective_date: NaiveDate,
    expiry_date: NaiveDate,
}

impl PolicyPeriod {
    /// Creates a new policy period, validating ordering and term length
    pub fn new(effective_date: NaiveDate, expiry_date: NaiveDate) -> Result<Self, PeriodError> {
        if effective_date >= expiry_date {
            return Err(PeriodError::InvalidOrder {
                effective: effective_date,
                expiry: expiry_date,
            });
        }

        let max_expiry = effective_date
            .checked_add_months(Months::new(MAX_TERM_MONTHS))
            .ok_or(PeriodError::TermTooLong {
                effective: effective_date,
                expiry: expiry_date,
            })?;

        if expiry_date > max_expiry {
            return Err(PeriodError::TermTooLong {
                effective: effective_date,
                expiry: expiry_date,
            });
        }

        Ok(Self {
            effective_date,
            expiry_date,
        })
    }

    /// Creates a standard annual period starting on the given date
    pub fn annual(effective_date: NaiveDate) -> Self {
        let expiry = effective_date
            .checked_add_months(Months::new(MAX_TERM_MONTHS))
            .expect("annual expiry date out of range");
        Self {
            effective_date,
            expiry_date: expiry,
        }
    }

    /// Returns the effective (start) date
    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    /// Returns the expiry (end) date
    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    /// Checks whether a date lies within the period (inclusive on both ends)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.effective_date && date <= self.expiry_date
    }

    /// Checks whether another period lies entirely within this one
    ///
    /// Used to validate that an endorsement's window falls inside its parent
    /// policy's term.
    pub fn encloses(&self, other: &PolicyPeriod) -> bool {
        other.effective_date >= self.effective_date && other.expiry_date <= self.expiry_date
    }

    /// Shortens the period to end on the given date
    ///
    /// The date must fall within the current period; used for mid-term
    /// termination.
    pub fn truncate(&self, new_expiry: NaiveDate) -> Result<Self, PeriodError> {
        if !self.contains(new_expiry) {
            return Err(PeriodError::OutOfPeriod { date: new_expiry });
        }
        if new_expiry <= self.effective_date {
            return Err(PeriodError::InvalidOrder {
                effective: self.effective_date,
                expiry: new_expiry,
            });
        }
        Ok(Self {
            effective_date: self.effective_date,
            expiry_date: new_expiry,
        })
    }

    /// Number of days in the period
    pub fn term_days(&self) -> i64 {
        (self.expiry_date - self.effective_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_valid_annual_period() {
        let period = PolicyPeriod::new(d(2025, 1, 1), d(2026, 1, 1)).unwrap();
        assert_eq!(period.term_days(), 365);
    }

    #[test]
    fn test_effective_must_precede_expiry() {
        let result = PolicyPeriod::new(d(2025, 6, 1), d(2025, 6, 1));
        assert!(matches!(result, Err(PeriodError::InvalidOrder { .. })));

        let result = PolicyPeriod::new(d(2025, 6, 2), d(2025, 6, 1));
        assert!(matches!(result, Err(PeriodError::InvalidOrder { .. })));
    }

    #[test]
    fn test_term_longer_than_one_year_rejected() {
        // 366 days on a non-leap span is one day past the 12-month cap
        let result = PolicyPeriod::new(d(2025, 1, 1), d(2026, 1, 2));
        assert!(matches!(result, Err(PeriodError::TermTooLong { .. })));
    }

    #[test]
    fn test_leap_year_annual_term_accepted() {
        // Feb 2024 contains the 29th; a full 12-month term spans 366 days
        let period = PolicyPeriod::new(d(2024, 2, 1), d(2025, 2, 1)).unwrap();
        assert_eq!(period.term_days(), 366);
    }

    #[test]
    fn test_contains() {
        let period = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
        assert!(period.contains(d(2025, 1, 1)));
        assert!(period.contains(d(2025, 6, 15)));
        assert!(period.contains(d(2025, 12, 31)));
        assert!(!period.contains(d(2024, 12, 31)));
        assert!(!period.contains(d(2026, 1, 1)));
    }

    #[test]
    fn test_encloses() {
        let policy = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
        let inside = PolicyPeriod::new(d(2025, 3, 1), d(2025, 9, 1)).unwrap();
        let straddles = PolicyPeriod::new(d(2024, 12, 1), d(2025, 3, 1)).unwrap();

        assert!(policy.encloses(&inside));
        assert!(!policy.encloses(&straddles));
    }

    #[test]
    fn test_truncate_for_termination() {
        let period = PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();

        let truncated = period.truncate(d(2025, 7, 1)).unwrap();
        assert_eq!(truncated.expiry_date(), d(2025, 7, 1));
        assert_eq!(truncated.effective_date(), d(2025, 1, 1));

        let result = period.truncate(d(2026, 2, 1));
        assert!(matches!(result, Err(PeriodError::OutOfPeriod { .. })));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn constructed_periods_always_hold_invariants(
            start_offset in 0i64..20_000i64,
            term in 1i64..365i64
        ) {
            let effective = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
                + chrono::Duration::days(start_offset);
            let expiry = effective + chrono::Duration::days(term);

            let period = PolicyPeriod::new(effective, expiry).unwrap();
            prop_assert!(period.effective_date() < period.expiry_date());
            prop_assert!(period.term_days() <= 366);
        }
    }
}
