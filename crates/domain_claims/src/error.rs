//! Claims domain errors

use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Claim amount must be positive, got {0}")]
    NonPositiveAmount(String),

    #[error("Incident date {incident} must not be after reported date {reported}")]
    IncidentAfterReported { incident: String, reported: String },

    #[error("Reported date {0} is in the future")]
    ReportedInFuture(String),

    #[error("Payment of {requested} exceeds remaining payable {remaining}")]
    PaymentExceedsRemaining { requested: String, remaining: String },

    #[error("Payment must be completed before it is applied, current status: {0}")]
    PaymentNotCompleted(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Financial error: {0}")]
    Money(#[from] MoneyError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ClaimError {
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        ClaimError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
