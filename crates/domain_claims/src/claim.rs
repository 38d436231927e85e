//! Claim aggregate
//!
//! # Invariants
//!
//! - `claim_amount > 0`
//! - `0 <= paid_amount <= claim_amount`
//! - `incident_date <= reported_date <= now`
//! - Status follows the forward-only table; Approved and Rejected are
//!   terminal for caller-requested transitions, and Closed is reached only
//!   when an approved claim becomes fully paid.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClaimId, Currency, Money, PolicyId};

use crate::document::ClaimDocument;
use crate::error::ClaimError;
use crate::payment::{ClaimPayment, PaymentStatus};

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Opened, awaiting assignment
    Pending,
    /// Under adjustment
    InProgress,
    /// Approved for payment
    Approved,
    /// Denied
    Rejected,
    /// Fully paid and closed
    Closed,
}

impl ClaimStatus {
    /// Whether a caller-requested transition to `target` is allowed
    ///
    /// Closed is never a valid target here; it is assigned by the aggregate
    /// when an approved claim becomes fully paid.
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, target),
            (Pending, InProgress) | (Pending, Rejected) | (InProgress, Approved) | (InProgress, Rejected)
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::InProgress => write!(f, "in_progress"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
            ClaimStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "in_progress" => Ok(ClaimStatus::InProgress),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            "closed" => Ok(ClaimStatus::Closed),
            other => Err(format!("unknown claim status '{}'", other)),
        }
    }
}

/// A claim against a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Claim number
    pub claim_number: String,
    /// Policy this claim is made under
    pub policy_id: PolicyId,
    /// Status
    pub status: ClaimStatus,
    /// Date of the incident
    pub incident_date: NaiveDate,
    /// Date the claim was reported
    pub reported_date: NaiveDate,
    /// Description of the loss
    pub description: Option<String>,
    /// Amount claimed
    pub claim_amount: Money,
    /// Total paid out so far
    pub paid_amount: Money,
    /// Currency
    pub currency: Currency,
    /// Attached documents
    pub documents: Vec<ClaimDocument>,
    /// Disbursements
    pub payments: Vec<ClaimPayment>,
    /// Version for optimistic concurrency; bumped by the repository on save
    pub version: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a new claim in Pending status with nothing paid
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the incident date is
    /// after the reported date, or the reported date is in the future.
    pub fn open(
        policy_id: PolicyId,
        incident_date: NaiveDate,
        reported_date: NaiveDate,
        claim_amount: Money,
        description: Option<String>,
    ) -> Result<Self, ClaimError> {
        if !claim_amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount(claim_amount.to_string()));
        }
        if incident_date > reported_date {
            return Err(ClaimError::IncidentAfterReported {
                incident: incident_date.to_string(),
                reported: reported_date.to_string(),
            });
        }
        let today = Utc::now().date_naive();
        if reported_date > today {
            return Err(ClaimError::ReportedInFuture(reported_date.to_string()));
        }

        let now = Utc::now();
        let currency = claim_amount.currency();
        Ok(Self {
            id: ClaimId::new_v7(),
            claim_number: generate_claim_number(),
            policy_id,
            status: ClaimStatus::Pending,
            incident_date,
            reported_date,
            description,
            claim_amount,
            paid_amount: Money::zero(currency),
            currency,
            documents: Vec::new(),
            payments: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates the status along the forward-only table
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.status.can_transition_to(status) {
            return Err(ClaimError::invalid_transition(self.status, status));
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remaining amount that may still be paid out
    pub fn remaining_payable(&self) -> Money {
        self.claim_amount - self.paid_amount
    }

    /// Validates that a payment of `amount` would be accepted
    ///
    /// Called before the payment partner is involved so a doomed request
    /// never leaves the building.
    pub fn check_payment_amount(&self, amount: Money) -> Result<(), ClaimError> {
        if !amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount(amount.to_string()));
        }
        let remaining = self.remaining_payable();
        if amount.checked_sub(&remaining)?.is_positive() {
            return Err(ClaimError::PaymentExceedsRemaining {
                requested: amount.to_string(),
                remaining: remaining.to_string(),
            });
        }
        Ok(())
    }

    /// Applies a completed payment, advancing the paid amount
    ///
    /// Only a payment in Completed status may be applied; the paid amount
    /// never exceeds the claim amount. An approved claim that becomes fully
    /// paid closes automatically.
    pub fn apply_payment(&mut self, payment: ClaimPayment) -> Result<(), ClaimError> {
        if payment.status != PaymentStatus::Completed {
            return Err(ClaimError::PaymentNotCompleted(payment.status.to_string()));
        }
        self.check_payment_amount(payment.amount)?;

        self.paid_amount = self.paid_amount.checked_add(&payment.amount)?;
        self.payments.push(payment);
        if self.status == ClaimStatus::Approved && self.remaining_payable().is_zero() {
            self.status = ClaimStatus::Closed;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records a payment that has not completed (pending or failed at the
    /// partner) without touching the paid amount
    pub fn record_payment_attempt(&mut self, payment: ClaimPayment) {
        self.payments.push(payment);
        self.updated_at = Utc::now();
    }

    /// Attaches a validated document
    pub fn add_document(&mut self, document: ClaimDocument) {
        self.documents.push(document);
        self.updated_at = Utc::now();
    }
}

fn generate_claim_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CLM-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentMethod;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn open_claim(amount: rust_decimal::Decimal) -> Claim {
        let today = Utc::now().date_naive();
        Claim::open(
            PolicyId::new(),
            today - Duration::days(10),
            today - Duration::days(3),
            usd(amount),
            Some("rear-end collision".to_string()),
        )
        .unwrap()
    }

    fn completed_payment(claim: &Claim, amount: rust_decimal::Decimal) -> ClaimPayment {
        let mut payment = ClaimPayment::new(
            claim.id,
            format!("SP-{}", amount),
            usd(amount),
            PaymentMethod::Ach,
        )
        .unwrap();
        payment.complete().unwrap();
        payment
    }

    #[test]
    fn test_open_claim_defaults() {
        let claim = open_claim(dec!(1000));
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert!(claim.paid_amount.is_zero());
        assert!(claim.claim_number.starts_with("CLM-"));
    }

    #[test]
    fn test_incident_after_reported_rejected() {
        let today = Utc::now().date_naive();
        let result = Claim::open(
            PolicyId::new(),
            today,
            today - Duration::days(1),
            usd(dec!(100)),
            None,
        );
        assert!(matches!(result, Err(ClaimError::IncidentAfterReported { .. })));
    }

    #[test]
    fn test_future_reported_date_rejected() {
        let today = Utc::now().date_naive();
        let result = Claim::open(
            PolicyId::new(),
            today,
            today + Duration::days(1),
            usd(dec!(100)),
            None,
        );
        assert!(matches!(result, Err(ClaimError::ReportedInFuture(_))));
    }

    #[test]
    fn test_status_table() {
        let mut claim = open_claim(dec!(1000));

        // Pending cannot jump straight to Approved
        assert!(claim.update_status(ClaimStatus::Approved).is_err());

        claim.update_status(ClaimStatus::InProgress).unwrap();
        claim.update_status(ClaimStatus::Approved).unwrap();

        // Approved is terminal for requested transitions
        assert!(claim.update_status(ClaimStatus::Rejected).is_err());
        assert!(claim.update_status(ClaimStatus::Pending).is_err());
        assert!(claim.update_status(ClaimStatus::Closed).is_err());
    }

    #[test]
    fn test_rejection_paths() {
        let mut from_pending = open_claim(dec!(1000));
        from_pending.update_status(ClaimStatus::Rejected).unwrap();

        let mut from_progress = open_claim(dec!(1000));
        from_progress.update_status(ClaimStatus::InProgress).unwrap();
        from_progress.update_status(ClaimStatus::Rejected).unwrap();

        assert!(from_pending.update_status(ClaimStatus::InProgress).is_err());
    }

    #[test]
    fn test_partial_then_excessive_payment() {
        // Spec scenario: 1000 claimed, 600 paid, then 500 must be rejected
        let mut claim = open_claim(dec!(1000));

        let payment = completed_payment(&claim, dec!(600));
        claim.apply_payment(payment).unwrap();
        assert_eq!(claim.paid_amount.amount(), dec!(600));
        assert_eq!(claim.status, ClaimStatus::Pending);

        let result = claim.check_payment_amount(usd(dec!(500)));
        assert!(matches!(
            result,
            Err(ClaimError::PaymentExceedsRemaining { .. })
        ));
        assert_eq!(claim.paid_amount.amount(), dec!(600));
    }

    #[test]
    fn test_paid_never_exceeds_claimed() {
        let mut claim = open_claim(dec!(500));
        let payment = completed_payment(&claim, dec!(501));
        assert!(claim.apply_payment(payment).is_err());
        assert!(claim.paid_amount.is_zero());
    }

    #[test]
    fn test_approved_claim_closes_when_fully_paid() {
        let mut claim = open_claim(dec!(800));
        claim.update_status(ClaimStatus::InProgress).unwrap();
        claim.update_status(ClaimStatus::Approved).unwrap();

        let first = completed_payment(&claim, dec!(300));
        claim.apply_payment(first).unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);

        let second = completed_payment(&claim, dec!(500));
        claim.apply_payment(second).unwrap();
        assert_eq!(claim.status, ClaimStatus::Closed);
        assert!(claim.remaining_payable().is_zero());
    }

    #[test]
    fn test_uncompleted_payment_not_applied() {
        let mut claim = open_claim(dec!(1000));
        let payment = ClaimPayment::new(
            claim.id,
            "SP-PENDING",
            usd(dec!(100)),
            PaymentMethod::Check,
        )
        .unwrap();

        assert!(matches!(
            claim.apply_payment(payment.clone()),
            Err(ClaimError::PaymentNotCompleted(_))
        ));

        // A pending attempt can still be recorded for the audit trail
        claim.record_payment_attempt(payment);
        assert_eq!(claim.payments.len(), 1);
        assert!(claim.paid_amount.is_zero());
    }
}
