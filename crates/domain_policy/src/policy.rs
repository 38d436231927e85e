//! Policy aggregate root
//!
//! The Policy aggregate is the consistency boundary for policy
//! administration: every change goes through a method that checks the
//! lifecycle rules first.
//!
//! # Invariants
//!
//! - The period always satisfies effective < expiry and the one-year cap
//! - A terminated policy rejects all mutation
//! - The termination date must fall within the current period
//! - Endorsement windows must fall within the policy period
//!
//! # State machine
//!
//! Valid transitions:
//! - Draft -> Active (via activate)
//! - Draft -> Cancelled (via cancel)
//! - Active -> Cancelled (via cancel)
//! - Active -> PendingRenewal (via mark_pending_renewal)
//! - Active -> Terminated (via terminate)
//! - Active -> Expired (via expire)
//! - PendingRenewal -> Expired (via expire)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, EndorsementId, PolicyId, PolicyPeriod, UserId};

use crate::coverage::Coverage;
use crate::endorsement::Endorsement;
use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::premium::{derive_premium, PremiumStatement};

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// Created but not yet bound
    Draft,
    /// In force
    Active,
    /// In the renewal window awaiting a renewal decision
    PendingRenewal,
    /// Cancelled before or during the term
    Cancelled,
    /// Reached its expiry date
    Expired,
    /// Terminated mid-term by explicit request
    Terminated,
}

impl PolicyStatus {
    /// Whether a caller-requested transition to `target` is allowed
    pub fn can_transition_to(&self, target: PolicyStatus) -> bool {
        use PolicyStatus::*;
        matches!(
            (self, target),
            (Draft, Active)
                | (Draft, Cancelled)
                | (Active, Cancelled)
                | (Active, PendingRenewal)
                | (Active, Terminated)
                | (Active, Expired)
                | (PendingRenewal, Expired)
        )
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyStatus::Draft => write!(f, "draft"),
            PolicyStatus::Active => write!(f, "active"),
            PolicyStatus::PendingRenewal => write!(f, "pending_renewal"),
            PolicyStatus::Cancelled => write!(f, "cancelled"),
            PolicyStatus::Expired => write!(f, "expired"),
            PolicyStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl std::str::FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PolicyStatus::Draft),
            "active" => Ok(PolicyStatus::Active),
            "pending_renewal" => Ok(PolicyStatus::PendingRenewal),
            "cancelled" => Ok(PolicyStatus::Cancelled),
            "expired" => Ok(PolicyStatus::Expired),
            "terminated" => Ok(PolicyStatus::Terminated),
            other => Err(format!("unknown policy status '{}'", other)),
        }
    }
}

/// The Policy aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier
    id: PolicyId,
    /// Human-readable policy number
    policy_number: String,
    /// Current lifecycle status
    status: PolicyStatus,
    /// In-force window
    period: PolicyPeriod,
    /// Owning user
    owner_id: UserId,
    /// Policy currency
    currency: Currency,
    /// Coverages under this policy
    coverages: Vec<Coverage>,
    /// Endorsements applied to this policy
    endorsements: Vec<Endorsement>,
    /// Domain events accumulated during the current mutation
    #[serde(skip)]
    events: Vec<PolicyEvent>,
    /// Version for optimistic concurrency; bumped by the repository on save
    version: i64,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Policy {
    /// Returns the policy ID
    pub fn id(&self) -> PolicyId {
        self.id
    }

    /// Returns the policy number
    pub fn policy_number(&self) -> &str {
        &self.policy_number
    }

    /// Returns the current status
    pub fn status(&self) -> PolicyStatus {
        self.status
    }

    /// Returns the in-force window
    pub fn period(&self) -> PolicyPeriod {
        self.period
    }

    /// Returns the owning user
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the policy currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the coverages
    pub fn coverages(&self) -> &[Coverage] {
        &self.coverages
    }

    /// Returns the endorsements
    pub fn endorsements(&self) -> &[Endorsement] {
        &self.endorsements
    }

    /// Returns the optimistic-lock version
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns the creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Checks if the policy is in force
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Checks if the policy can be modified
    ///
    /// Terminated, cancelled, and expired policies are read-only.
    pub fn is_modifiable(&self) -> bool {
        matches!(
            self.status,
            PolicyStatus::Draft | PolicyStatus::Active | PolicyStatus::PendingRenewal
        )
    }

    fn ensure_modifiable(&self) -> Result<(), PolicyError> {
        if !self.is_modifiable() {
            return Err(PolicyError::NotModifiable {
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Derives the current premium statement
    pub fn premium(&self) -> Result<PremiumStatement, PolicyError> {
        derive_premium(self.currency, &self.coverages, &self.endorsements)
    }

    /// Activates a draft policy
    pub fn activate(&mut self) -> Result<(), PolicyError> {
        self.transition(PolicyStatus::Active)?;
        self.push_event(PolicyEvent::PolicyActivated {
            policy_id: self.id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Cancels the policy
    pub fn cancel(&mut self, reason: &str) -> Result<(), PolicyError> {
        self.transition(PolicyStatus::Cancelled)?;
        self.push_event(PolicyEvent::PolicyCancelled {
            policy_id: self.id,
            reason: reason.to_string(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Moves an active policy into its renewal window
    pub fn mark_pending_renewal(&mut self) -> Result<(), PolicyError> {
        self.transition(PolicyStatus::PendingRenewal)?;
        self.push_event(PolicyEvent::PolicyMarkedForRenewal {
            policy_id: self.id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Expires the policy at the end of its term
    pub fn expire(&mut self) -> Result<(), PolicyError> {
        self.transition(PolicyStatus::Expired)?;
        self.push_event(PolicyEvent::PolicyExpired {
            policy_id: self.id,
            expiry_date: self.period.expiry_date(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Terminates an active policy mid-term
    ///
    /// The termination date must fall within the current period; the expiry
    /// date is pulled in to the termination date.
    pub fn terminate(&mut self, termination_date: NaiveDate) -> Result<(), PolicyError> {
        if self.status != PolicyStatus::Active {
            return Err(PolicyError::invalid_transition(
                self.status,
                PolicyStatus::Terminated,
            ));
        }
        if !self.period.contains(termination_date) {
            return Err(PolicyError::TerminationDateOutsidePeriod(termination_date));
        }

        self.period = self.period.truncate(termination_date)?;
        self.status = PolicyStatus::Terminated;
        self.updated_at = Utc::now();
        self.push_event(PolicyEvent::PolicyTerminated {
            policy_id: self.id,
            termination_date,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Replaces the mutable detail fields (period, owner)
    ///
    /// Rejected when the policy is not modifiable. Status changes go through
    /// the dedicated transition methods, never through update.
    pub fn update_details(
        &mut self,
        period: Option<PolicyPeriod>,
        owner_id: Option<UserId>,
    ) -> Result<(), PolicyError> {
        self.ensure_modifiable()?;

        if let Some(period) = period {
            // Every attached endorsement must still fit the new window
            if self
                .endorsements
                .iter()
                .any(|e| e.is_rated() && !period.encloses(&e.period))
            {
                return Err(PolicyError::EndorsementOutsidePolicyPeriod);
            }
            self.period = period;
        }
        if let Some(owner_id) = owner_id {
            self.owner_id = owner_id;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Adds a coverage
    pub fn add_coverage(&mut self, coverage: Coverage) -> Result<(), PolicyError> {
        self.ensure_modifiable()?;
        if coverage.premium.currency() != self.currency {
            return Err(PolicyError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: coverage.premium.currency().to_string(),
            });
        }
        self.coverages.push(coverage);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attaches a draft endorsement
    ///
    /// The endorsement window must fall entirely within the policy period.
    pub fn add_endorsement(&mut self, endorsement: Endorsement) -> Result<(), PolicyError> {
        self.ensure_modifiable()?;
        if !self.period.encloses(&endorsement.period) {
            return Err(PolicyError::EndorsementOutsidePolicyPeriod);
        }
        if endorsement.premium_adjustment.currency() != self.currency {
            return Err(PolicyError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: endorsement.premium_adjustment.currency().to_string(),
            });
        }

        self.updated_at = Utc::now();
        self.push_event(PolicyEvent::EndorsementAttached {
            policy_id: self.id,
            endorsement_id: endorsement.id,
            timestamp: self.updated_at,
        });
        self.endorsements.push(endorsement);
        Ok(())
    }

    /// Approves an attached endorsement
    pub fn approve_endorsement(
        &mut self,
        endorsement_id: EndorsementId,
        approver: &str,
    ) -> Result<(), PolicyError> {
        self.ensure_modifiable()?;
        let endorsement = self
            .endorsements
            .iter_mut()
            .find(|e| e.id == endorsement_id)
            .ok_or_else(|| PolicyError::EndorsementNotFound(endorsement_id.to_string()))?;

        endorsement.approve(approver)?;
        self.updated_at = Utc::now();
        self.push_event(PolicyEvent::EndorsementApproved {
            policy_id: self.id,
            endorsement_id,
            approved_by: approver.to_string(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    fn transition(&mut self, target: PolicyStatus) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(target) {
            return Err(PolicyError::invalid_transition(self.status, target));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn push_event(&mut self, event: PolicyEvent) {
        self.events.push(event);
    }

    /// Rehydrates a policy previously persisted
    ///
    /// Callers are the repositories; stored rows already satisfied the
    /// aggregate invariants when written.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: PolicyId,
        policy_number: String,
        status: PolicyStatus,
        period: PolicyPeriod,
        owner_id: UserId,
        currency: Currency,
        coverages: Vec<Coverage>,
        endorsements: Vec<Endorsement>,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            policy_number,
            status,
            period,
            owner_id,
            currency,
            coverages,
            endorsements,
            events: Vec::new(),
            version,
            created_at,
            updated_at,
        }
    }
}

/// Builder for creating new policies
///
/// # Example
///
/// ```rust,ignore
/// let policy = PolicyBuilder::new()
///     .owner(user_id)
///     .period(PolicyPeriod::annual(effective))
///     .add_coverage(liability)
///     .build()?;
/// ```
pub struct PolicyBuilder {
    policy_number: Option<String>,
    period: Option<PolicyPeriod>,
    owner_id: Option<UserId>,
    currency: Currency,
    coverages: Vec<Coverage>,
}

impl PolicyBuilder {
    /// Creates a new policy builder with default values
    pub fn new() -> Self {
        Self {
            policy_number: None,
            period: None,
            owner_id: None,
            currency: Currency::USD,
            coverages: Vec::new(),
        }
    }

    /// Overrides the generated policy number
    pub fn policy_number(mut self, number: impl Into<String>) -> Self {
        self.policy_number = Some(number.into());
        self
    }

    /// Sets the in-force window
    pub fn period(mut self, period: PolicyPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets the owning user
    pub fn owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Sets the currency
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Adds a coverage
    pub fn add_coverage(mut self, coverage: Coverage) -> Self {
        self.coverages.push(coverage);
        self
    }

    /// Builds the policy in Draft status
    ///
    /// # Errors
    ///
    /// Returns an error if the period or owner is missing, or if any
    /// coverage is priced in a different currency.
    pub fn build(self) -> Result<Policy, PolicyError> {
        let period = self
            .period
            .ok_or_else(|| PolicyError::MissingRequiredField("period".to_string()))?;
        let owner_id = self
            .owner_id
            .ok_or_else(|| PolicyError::MissingRequiredField("owner_id".to_string()))?;

        for coverage in &self.coverages {
            if coverage.premium.currency() != self.currency {
                return Err(PolicyError::CurrencyMismatch {
                    expected: self.currency.to_string(),
                    actual: coverage.premium.currency().to_string(),
                });
            }
        }

        let now = Utc::now();
        let id = PolicyId::new_v7();
        let policy_number = self.policy_number.unwrap_or_else(generate_policy_number);

        Ok(Policy {
            id,
            policy_number: policy_number.clone(),
            status: PolicyStatus::Draft,
            period,
            owner_id,
            currency: self.currency,
            coverages: self.coverages,
            endorsements: Vec::new(),
            events: vec![PolicyEvent::PolicyCreated {
                policy_id: id,
                policy_number,
                timestamp: now,
            }],
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a unique policy number
///
/// Format: UMB-{YEAR}{MONTH}-{SEQUENCE}
fn generate_policy_number() -> String {
    let now = Utc::now();
    format!(
        "UMB-{}{:02}-{:06}",
        now.format("%Y"),
        now.format("%m"),
        sequence()
    )
}

fn sequence() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (duration.as_nanos() % 1_000_000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageType;
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn test_policy() -> Policy {
        let coverage = Coverage::new(
            CoverageType::PersonalLiability,
            usd(dec!(1_000_000)),
            usd(dec!(0)),
            usd(dec!(400)),
        )
        .unwrap();

        PolicyBuilder::new()
            .owner(UserId::new())
            .period(PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap())
            .add_coverage(coverage)
            .build()
            .unwrap()
    }

    #[test]
    fn test_policy_starts_in_draft() {
        let policy = test_policy();
        assert_eq!(policy.status(), PolicyStatus::Draft);
        assert_eq!(policy.version(), 1);
        assert!(policy.policy_number().starts_with("UMB-"));
    }

    #[test]
    fn test_activate_then_terminate() {
        let mut policy = test_policy();
        policy.activate().unwrap();
        assert!(policy.is_active());

        policy.terminate(d(2025, 6, 30)).unwrap();
        assert_eq!(policy.status(), PolicyStatus::Terminated);
        assert_eq!(policy.period().expiry_date(), d(2025, 6, 30));
    }

    #[test]
    fn test_terminate_requires_active() {
        let mut policy = test_policy();
        let result = policy.terminate(d(2025, 6, 30));
        assert!(matches!(
            result,
            Err(PolicyError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_termination_date_must_be_in_period() {
        let mut policy = test_policy();
        policy.activate().unwrap();

        let result = policy.terminate(d(2026, 2, 1));
        assert!(matches!(
            result,
            Err(PolicyError::TerminationDateOutsidePeriod(_))
        ));
        // Failed termination leaves the policy untouched
        assert!(policy.is_active());
        assert_eq!(policy.period().expiry_date(), d(2025, 12, 31));
    }

    #[test]
    fn test_terminated_policy_rejects_updates() {
        let mut policy = test_policy();
        policy.activate().unwrap();
        policy.terminate(d(2025, 6, 30)).unwrap();

        let result = policy.update_details(None, Some(UserId::new()));
        assert!(matches!(result, Err(PolicyError::NotModifiable { .. })));
    }

    #[test]
    fn test_endorsement_window_validated() {
        let mut policy = test_policy();
        policy.activate().unwrap();

        let outside = Endorsement::new(
            "off-term change",
            usd(dec!(50)),
            PolicyPeriod::new(d(2025, 10, 1), d(2026, 3, 1)).unwrap(),
        );
        assert!(matches!(
            policy.add_endorsement(outside),
            Err(PolicyError::EndorsementOutsidePolicyPeriod)
        ));

        let inside = Endorsement::new(
            "mid-term change",
            usd(dec!(50)),
            PolicyPeriod::new(d(2025, 3, 1), d(2025, 9, 1)).unwrap(),
        );
        policy.add_endorsement(inside).unwrap();
        assert_eq!(policy.endorsements().len(), 1);
    }

    #[test]
    fn test_premium_reflects_approved_endorsement() {
        let mut policy = test_policy();
        policy.activate().unwrap();

        let endorsement = Endorsement::new(
            "add watercraft",
            usd(dec!(125)),
            PolicyPeriod::new(d(2025, 3, 1), d(2025, 9, 1)).unwrap(),
        );
        let endorsement_id = endorsement.id;
        policy.add_endorsement(endorsement).unwrap();

        assert_eq!(policy.premium().unwrap().total.amount(), dec!(400));

        policy
            .approve_endorsement(endorsement_id, "mgr.briggs")
            .unwrap();
        assert_eq!(policy.premium().unwrap().total.amount(), dec!(525));
    }

    #[test]
    fn test_events_accumulate_and_drain() {
        let mut policy = test_policy();
        policy.activate().unwrap();

        let events = policy.take_events();
        assert_eq!(events.len(), 2); // created + activated
        assert!(policy.take_events().is_empty());
    }

    #[test]
    fn test_cancel_from_draft_and_active() {
        let mut draft = test_policy();
        draft.cancel("never bound").unwrap();
        assert_eq!(draft.status(), PolicyStatus::Cancelled);

        let mut active = test_policy();
        active.activate().unwrap();
        active.cancel("non-payment").unwrap();
        assert_eq!(active.status(), PolicyStatus::Cancelled);
    }

    #[test]
    fn test_expired_policy_cannot_reactivate() {
        let mut policy = test_policy();
        policy.activate().unwrap();
        policy.expire().unwrap();

        assert!(policy.activate().is_err());
        assert!(!policy.is_modifiable());
    }

    #[test]
    fn test_builder_requires_owner_and_period() {
        let result = PolicyBuilder::new()
            .period(PolicyPeriod::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap())
            .build();
        assert!(matches!(
            result,
            Err(PolicyError::MissingRequiredField(field)) if field == "owner_id"
        ));
    }
}
