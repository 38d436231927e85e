//! Claims domain
//!
//! The Claim aggregate owns its documents and payments and enforces the
//! forward-only status table, the paid-versus-claimed bound, and the
//! document upload rules.

pub mod claim;
pub mod document;
pub mod payment;
pub mod error;

pub use claim::{Claim, ClaimStatus};
pub use document::{ClaimDocument, ALLOWED_CONTENT_TYPES, MAX_DOCUMENT_BYTES};
pub use payment::{ClaimPayment, PaymentMethod, PaymentStatus};
pub use error::ClaimError;
