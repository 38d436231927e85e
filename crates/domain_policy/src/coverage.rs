//! Coverage entities
//!
//! A coverage is one insured exposure under an umbrella policy: its type,
//! limit, deductible, and the premium it contributes to the policy total.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CoverageId, Money};
use crate::error::PolicyError;

/// Types of umbrella coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageType {
    /// Excess personal liability
    PersonalLiability,
    /// Excess property damage liability
    PropertyDamage,
    /// Uninsured/underinsured motorist
    UninsuredMotorist,
    /// Excess over an underlying auto policy
    ExcessAuto,
    /// Excess over an underlying homeowners policy
    ExcessHome,
    /// Watercraft liability
    Watercraft,
    /// Product-specific coverage
    Custom(String),
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageType::PersonalLiability => write!(f, "personal_liability"),
            CoverageType::PropertyDamage => write!(f, "property_damage"),
            CoverageType::UninsuredMotorist => write!(f, "uninsured_motorist"),
            CoverageType::ExcessAuto => write!(f, "excess_auto"),
            CoverageType::ExcessHome => write!(f, "excess_home"),
            CoverageType::Watercraft => write!(f, "watercraft"),
            CoverageType::Custom(code) => write!(f, "custom:{}", code),
        }
    }
}

impl std::str::FromStr for CoverageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal_liability" => Ok(CoverageType::PersonalLiability),
            "property_damage" => Ok(CoverageType::PropertyDamage),
            "uninsured_motorist" => Ok(CoverageType::UninsuredMotorist),
            "excess_auto" => Ok(CoverageType::ExcessAuto),
            "excess_home" => Ok(CoverageType::ExcessHome),
            "watercraft" => Ok(CoverageType::Watercraft),
            other => match other.strip_prefix("custom:") {
                Some(code) if !code.is_empty() => Ok(CoverageType::Custom(code.to_string())),
                _ => Err(format!("unknown coverage type '{}'", other)),
            },
        }
    }
}

/// Coverage lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// In force and contributing premium
    Active,
    /// Removed from the policy; contributes nothing
    Inactive,
    /// Awaiting underwriting acceptance; priced but not yet in force
    Pending,
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageStatus::Active => write!(f, "active"),
            CoverageStatus::Inactive => write!(f, "inactive"),
            CoverageStatus::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for CoverageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CoverageStatus::Active),
            "inactive" => Ok(CoverageStatus::Inactive),
            "pending" => Ok(CoverageStatus::Pending),
            other => Err(format!("unknown coverage status '{}'", other)),
        }
    }
}

/// A coverage under a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coverage {
    /// Unique identifier for this coverage
    pub id: CoverageId,
    /// Type of coverage
    pub coverage_type: CoverageType,
    /// Per-occurrence limit
    pub limit: Money,
    /// Deductible (self-insured retention)
    pub deductible: Money,
    /// Premium this coverage contributes
    pub premium: Money,
    /// Lifecycle status
    pub status: CoverageStatus,
}

impl Coverage {
    /// Creates a new active coverage, validating amounts
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidCoverage` if limit, deductible, or
    /// premium is negative.
    pub fn new(
        coverage_type: CoverageType,
        limit: Money,
        deductible: Money,
        premium: Money,
    ) -> Result<Self, PolicyError> {
        if limit.is_negative() {
            return Err(PolicyError::InvalidCoverage(format!(
                "limit must not be negative, got {}",
                limit
            )));
        }
        if deductible.is_negative() {
            return Err(PolicyError::InvalidCoverage(format!(
                "deductible must not be negative, got {}",
                deductible
            )));
        }
        if premium.is_negative() {
            return Err(PolicyError::InvalidCoverage(format!(
                "premium must not be negative, got {}",
                premium
            )));
        }

        Ok(Self {
            id: CoverageId::new_v7(),
            coverage_type,
            limit,
            deductible,
            premium,
            status: CoverageStatus::Active,
        })
    }

    /// Creates a personal liability coverage with no deductible
    pub fn personal_liability(limit: Money, premium: Money) -> Result<Self, PolicyError> {
        let deductible = Money::zero(limit.currency());
        Self::new(CoverageType::PersonalLiability, limit, deductible, premium)
    }

    /// Marks the coverage as pending underwriting acceptance
    pub fn pending(mut self) -> Self {
        self.status = CoverageStatus::Pending;
        self
    }

    /// Deactivates the coverage
    pub fn deactivate(&mut self) {
        self.status = CoverageStatus::Inactive;
    }

    /// Whether this coverage contributes to the derived premium
    pub fn is_rated(&self) -> bool {
        self.status != CoverageStatus::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_coverage_creation() {
        let coverage = Coverage::new(
            CoverageType::PersonalLiability,
            usd(dec!(1_000_000)),
            usd(dec!(500)),
            usd(dec!(350)),
        )
        .unwrap();

        assert_eq!(coverage.status, CoverageStatus::Active);
        assert!(coverage.is_rated());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let result = Coverage::new(
            CoverageType::ExcessAuto,
            usd(dec!(-1)),
            usd(dec!(0)),
            usd(dec!(100)),
        );
        assert!(matches!(result, Err(PolicyError::InvalidCoverage(_))));

        let result = Coverage::new(
            CoverageType::ExcessAuto,
            usd(dec!(1_000_000)),
            usd(dec!(0)),
            usd(dec!(-100)),
        );
        assert!(matches!(result, Err(PolicyError::InvalidCoverage(_))));
    }

    #[test]
    fn test_zero_amounts_allowed() {
        let coverage = Coverage::new(
            CoverageType::Watercraft,
            usd(dec!(0)),
            usd(dec!(0)),
            usd(dec!(0)),
        );
        assert!(coverage.is_ok());
    }

    #[test]
    fn test_deactivated_coverage_not_rated() {
        let mut coverage =
            Coverage::personal_liability(usd(dec!(2_000_000)), usd(dec!(400))).unwrap();
        coverage.deactivate();
        assert!(!coverage.is_rated());
    }
}
