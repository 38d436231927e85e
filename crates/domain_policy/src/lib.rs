//! Policy administration domain
//!
//! This crate owns the Policy aggregate and its component entities:
//! coverages, endorsements, and the derived premium. All lifecycle rules
//! (status transitions, period validation, termination) live on the
//! aggregate so invalid states cannot be produced by any entry point.

pub mod policy;
pub mod coverage;
pub mod endorsement;
pub mod premium;
pub mod events;
pub mod error;

pub use policy::{Policy, PolicyBuilder, PolicyStatus};
pub use coverage::{Coverage, CoverageStatus, CoverageType};
pub use endorsement::{Endorsement, EndorsementStatus};
pub use premium::{derive_premium, installments, PremiumStatement};
pub use events::PolicyEvent;
pub use error::PolicyError;
