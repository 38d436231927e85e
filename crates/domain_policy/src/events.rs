//! Policy domain events
//!
//! Events accumulate on the aggregate during a mutation and are drained by
//! the application service, which emits them to the structured log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{EndorsementId, PolicyId};

/// Events raised by the Policy aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyEvent {
    PolicyCreated {
        policy_id: PolicyId,
        policy_number: String,
        timestamp: DateTime<Utc>,
    },
    PolicyActivated {
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },
    PolicyCancelled {
        policy_id: PolicyId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    PolicyMarkedForRenewal {
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },
    PolicyExpired {
        policy_id: PolicyId,
        expiry_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PolicyTerminated {
        policy_id: PolicyId,
        termination_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    EndorsementAttached {
        policy_id: PolicyId,
        endorsement_id: EndorsementId,
        timestamp: DateTime<Utc>,
    },
    EndorsementApproved {
        policy_id: PolicyId,
        endorsement_id: EndorsementId,
        approved_by: String,
        timestamp: DateTime<Utc>,
    },
}

impl PolicyEvent {
    /// Short name used as the log event field
    pub fn name(&self) -> &'static str {
        match self {
            PolicyEvent::PolicyCreated { .. } => "policy_created",
            PolicyEvent::PolicyActivated { .. } => "policy_activated",
            PolicyEvent::PolicyCancelled { .. } => "policy_cancelled",
            PolicyEvent::PolicyMarkedForRenewal { .. } => "policy_marked_for_renewal",
            PolicyEvent::PolicyExpired { .. } => "policy_expired",
            PolicyEvent::PolicyTerminated { .. } => "policy_terminated",
            PolicyEvent::EndorsementAttached { .. } => "endorsement_attached",
            PolicyEvent::EndorsementApproved { .. } => "endorsement_approved",
        }
    }
}
