//! Access domain errors

use thiserror::Error;

/// Errors that can occur in the access domain
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Role already assigned: {0}")]
    RoleAlreadyAssigned(String),
}

impl From<validator::ValidationErrors> for AccessError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AccessError::Validation(errors.to_string())
    }
}
