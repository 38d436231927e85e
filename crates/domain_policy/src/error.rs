//! Policy domain errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{MoneyError, PeriodError};

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Invalid status transition attempted
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Policy cannot be modified in current status
    #[error("Policy cannot be modified while {status}")]
    NotModifiable { status: String },

    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Currency mismatch between policy and a component amount
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Period validation failed
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Money arithmetic failed
    #[error("Financial error: {0}")]
    Money(#[from] MoneyError),

    /// Termination date outside the policy period
    #[error("Termination date {0} is outside the policy period")]
    TerminationDateOutsidePeriod(NaiveDate),

    /// Endorsement window falls outside the parent policy period
    #[error("Endorsement period falls outside the policy period")]
    EndorsementOutsidePolicyPeriod,

    /// Endorsement not found on this policy
    #[error("Endorsement not found: {0}")]
    EndorsementNotFound(String),

    /// Invalid coverage configuration
    #[error("Invalid coverage: {0}")]
    InvalidCoverage(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    /// Creates an invalid-transition error from display values
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        PolicyError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
