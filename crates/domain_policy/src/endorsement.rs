//! Policy endorsements
//!
//! An endorsement is a mid-term modification to a policy: it carries a
//! premium adjustment (positive or negative) and an effective window that
//! must fall inside the parent policy's period. Endorsements move through a
//! small approval lifecycle; only approved endorsements affect the derived
//! premium.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{EndorsementId, Money, PolicyPeriod};
use crate::error::PolicyError;

/// Status of an endorsement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementStatus {
    /// Drafted, awaiting review
    Draft,
    /// Approved; contributes its premium adjustment
    Approved,
    /// Rejected during review
    Rejected,
    /// Withdrawn before or after approval
    Cancelled,
}

impl fmt::Display for EndorsementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndorsementStatus::Draft => write!(f, "draft"),
            EndorsementStatus::Approved => write!(f, "approved"),
            EndorsementStatus::Rejected => write!(f, "rejected"),
            EndorsementStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for EndorsementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EndorsementStatus::Draft),
            "approved" => Ok(EndorsementStatus::Approved),
            "rejected" => Ok(EndorsementStatus::Rejected),
            "cancelled" => Ok(EndorsementStatus::Cancelled),
            other => Err(format!("unknown endorsement status '{}'", other)),
        }
    }
}

/// A mid-term modification to a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endorsement {
    /// Unique endorsement identifier
    pub id: EndorsementId,
    /// Human-readable endorsement number
    pub endorsement_number: String,
    /// What the endorsement changes
    pub description: String,
    /// Premium adjustment (positive = additional premium, negative = return)
    pub premium_adjustment: Money,
    /// Window during which the change applies; must lie within the policy period
    pub period: PolicyPeriod,
    /// Current status
    pub status: EndorsementStatus,
    /// Who requested the endorsement
    pub requested_by: Option<String>,
    /// Who approved or rejected it
    pub reviewed_by: Option<String>,
    /// Reason recorded on rejection or cancellation
    pub review_note: Option<String>,
    /// When the endorsement was created
    pub created_at: DateTime<Utc>,
    /// When the endorsement was approved, rejected, or cancelled
    pub processed_at: Option<DateTime<Utc>>,
}

impl Endorsement {
    /// Creates a new draft endorsement
    pub fn new(
        description: impl Into<String>,
        premium_adjustment: Money,
        period: PolicyPeriod,
    ) -> Self {
        Self {
            id: EndorsementId::new_v7(),
            endorsement_number: generate_endorsement_number(),
            description: description.into(),
            premium_adjustment,
            period,
            status: EndorsementStatus::Draft,
            requested_by: None,
            reviewed_by: None,
            review_note: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Sets who requested the endorsement
    pub fn requested_by(mut self, user: impl Into<String>) -> Self {
        self.requested_by = Some(user.into());
        self
    }

    /// Approves the endorsement (Draft only)
    pub fn approve(&mut self, approver: &str) -> Result<(), PolicyError> {
        if self.status != EndorsementStatus::Draft {
            return Err(PolicyError::invalid_transition(
                self.status,
                EndorsementStatus::Approved,
            ));
        }
        self.status = EndorsementStatus::Approved;
        self.reviewed_by = Some(approver.to_string());
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Rejects the endorsement (Draft only)
    pub fn reject(&mut self, reviewer: &str, reason: &str) -> Result<(), PolicyError> {
        if self.status != EndorsementStatus::Draft {
            return Err(PolicyError::invalid_transition(
                self.status,
                EndorsementStatus::Rejected,
            ));
        }
        self.status = EndorsementStatus::Rejected;
        self.reviewed_by = Some(reviewer.to_string());
        self.review_note = Some(reason.to_string());
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels the endorsement (Draft or Approved)
    pub fn cancel(&mut self, reason: &str) -> Result<(), PolicyError> {
        match self.status {
            EndorsementStatus::Draft | EndorsementStatus::Approved => {
                self.status = EndorsementStatus::Cancelled;
                self.review_note = Some(reason.to_string());
                self.processed_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(PolicyError::invalid_transition(
                self.status,
                EndorsementStatus::Cancelled,
            )),
        }
    }

    /// Whether this endorsement contributes to the derived premium
    pub fn is_rated(&self) -> bool {
        self.status == EndorsementStatus::Approved
    }

    /// Whether this endorsement requires additional premium when approved
    pub fn requires_additional_premium(&self) -> bool {
        self.premium_adjustment.is_positive()
    }
}

/// Generates a unique endorsement number
fn generate_endorsement_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("END-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn test_period() -> PolicyPeriod {
        PolicyPeriod::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        )
        .unwrap()
    }

    fn test_endorsement() -> Endorsement {
        Endorsement::new(
            "Add watercraft exposure",
            Money::new(dec!(125), Currency::USD),
            test_period(),
        )
    }

    #[test]
    fn test_new_endorsement_is_draft() {
        let endorsement = test_endorsement();
        assert_eq!(endorsement.status, EndorsementStatus::Draft);
        assert!(endorsement.endorsement_number.starts_with("END-"));
        assert!(!endorsement.is_rated());
    }

    #[test]
    fn test_approval() {
        let mut endorsement = test_endorsement();
        endorsement.approve("mgr.briggs").unwrap();

        assert_eq!(endorsement.status, EndorsementStatus::Approved);
        assert_eq!(endorsement.reviewed_by.as_deref(), Some("mgr.briggs"));
        assert!(endorsement.is_rated());
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut endorsement = test_endorsement();
        endorsement.reject("mgr.briggs", "exposure declined").unwrap();

        assert!(endorsement.approve("mgr.briggs").is_err());
        assert!(endorsement.cancel("too late").is_err());
    }

    #[test]
    fn test_approved_can_be_cancelled() {
        let mut endorsement = test_endorsement();
        endorsement.approve("mgr.briggs").unwrap();
        endorsement.cancel("insured withdrew request").unwrap();

        assert_eq!(endorsement.status, EndorsementStatus::Cancelled);
        assert!(!endorsement.is_rated());
    }

    #[test]
    fn test_return_premium_endorsement() {
        let endorsement = Endorsement::new(
            "Remove second vehicle",
            Money::new(dec!(-80), Currency::USD),
            test_period(),
        );
        assert!(!endorsement.requires_additional_premium());
    }
}
