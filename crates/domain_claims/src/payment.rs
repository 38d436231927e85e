//! Claim payments
//!
//! A payment is created when the payment partner accepts a disbursement
//! request. Its status advances one way only; a payment that reaches
//! Completed is the only kind that moves a claim's paid amount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClaimId, Money, PaymentId};
use crate::error::ClaimError;

/// Payment status
///
/// One-directional: Pending -> Processing -> {Completed, Failed, Error};
/// Pending may also fail directly. Completed, Failed, and Error are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Error,
}

impl PaymentStatus {
    /// Whether a transition to `target` is allowed
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Pending, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Error)
        )
    }

    /// Whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Error
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "error" => Ok(PaymentStatus::Error),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

/// Disbursement method offered by the payment partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Ach,
    DebitCard,
    Check,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Ach => write!(f, "ach"),
            PaymentMethod::DebitCard => write!(f, "debit_card"),
            PaymentMethod::Check => write!(f, "check"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ach" => Ok(PaymentMethod::Ach),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "check" => Ok(PaymentMethod::Check),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// A disbursement against a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimPayment {
    pub id: PaymentId,
    pub claim_id: ClaimId,
    /// Transaction id assigned by the payment partner; unique
    pub transaction_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimPayment {
    /// Creates a new pending payment
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not strictly positive.
    pub fn new(
        claim_id: ClaimId,
        transaction_id: impl Into<String>,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<Self, ClaimError> {
        if !amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount(amount.to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            id: PaymentId::new_v7(),
            claim_id,
            transaction_id: transaction_id.into(),
            amount,
            method,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Advances the payment status along the one-directional table
    pub fn update_status(&mut self, status: PaymentStatus) -> Result<(), ClaimError> {
        if !self.status.can_transition_to(status) {
            return Err(ClaimError::invalid_transition(self.status, status));
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Convenience: Pending -> Processing -> Completed
    pub fn complete(&mut self) -> Result<(), ClaimError> {
        if self.status == PaymentStatus::Pending {
            self.update_status(PaymentStatus::Processing)?;
        }
        self.update_status(PaymentStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn payment(amount: rust_decimal::Decimal) -> Result<ClaimPayment, ClaimError> {
        ClaimPayment::new(
            ClaimId::new(),
            "SP-20250612-0001",
            Money::new(amount, Currency::USD),
            PaymentMethod::Ach,
        )
    }

    #[test]
    fn test_new_payment_is_pending() {
        let p = payment(dec!(600)).unwrap();
        assert_eq!(p.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        assert!(matches!(
            payment(dec!(0)),
            Err(ClaimError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            payment(dec!(-50)),
            Err(ClaimError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_forward_only_transitions() {
        let mut p = payment(dec!(600)).unwrap();
        p.update_status(PaymentStatus::Processing).unwrap();
        p.update_status(PaymentStatus::Completed).unwrap();

        // Completed is terminal in every direction
        assert!(p.update_status(PaymentStatus::Processing).is_err());
        assert!(p.update_status(PaymentStatus::Failed).is_err());
        assert!(p.update_status(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut p = payment(dec!(600)).unwrap();
        assert!(p.update_status(PaymentStatus::Completed).is_err());
    }

    #[test]
    fn test_processing_can_error() {
        let mut p = payment(dec!(600)).unwrap();
        p.update_status(PaymentStatus::Processing).unwrap();
        p.update_status(PaymentStatus::Error).unwrap();
        assert!(p.status.is_terminal());
    }
}
