//! Claim documents
//!
//! Documents are stored out-of-band (object storage); the claim keeps only
//! the metadata. Upload rules: the file must be non-empty, at most 10 MiB,
//! and of an allow-listed content type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DocumentId};
use crate::error::ClaimError;

/// Maximum document size in bytes (10 MiB, inclusive)
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted for claim documents
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Metadata for a document attached to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub id: DocumentId,
    pub claim_id: ClaimId,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Object-storage key where the bytes live
    pub storage_location: String,
    pub uploaded_at: DateTime<Utc>,
}

impl ClaimDocument {
    /// Creates document metadata after validating the upload rules
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidDocument` if the file name is empty, the
    /// file is empty or over 10 MiB, or the content type is not allow-listed.
    pub fn new(
        claim_id: ClaimId,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: u64,
        storage_location: impl Into<String>,
    ) -> Result<Self, ClaimError> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if file_name.trim().is_empty() {
            return Err(ClaimError::InvalidDocument(
                "file name must not be empty".to_string(),
            ));
        }
        if size_bytes == 0 {
            return Err(ClaimError::InvalidDocument(
                "file must not be empty".to_string(),
            ));
        }
        if size_bytes > MAX_DOCUMENT_BYTES {
            return Err(ClaimError::InvalidDocument(format!(
                "file size {} exceeds maximum of {} bytes",
                size_bytes, MAX_DOCUMENT_BYTES
            )));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ClaimError::InvalidDocument(format!(
                "content type '{}' is not accepted",
                content_type
            )));
        }

        Ok(Self {
            id: DocumentId::new_v7(),
            claim_id,
            file_name,
            content_type,
            size_bytes,
            storage_location: storage_location.into(),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(size: u64, content_type: &str) -> Result<ClaimDocument, ClaimError> {
        ClaimDocument::new(
            ClaimId::new(),
            "police-report.pdf",
            content_type,
            size,
            "claims/2025/police-report.pdf",
        )
    }

    #[test]
    fn test_valid_document() {
        let document = doc(48_213, "application/pdf").unwrap();
        assert_eq!(document.file_name, "police-report.pdf");
    }

    #[test]
    fn test_exactly_at_limit_accepted() {
        assert!(doc(MAX_DOCUMENT_BYTES, "application/pdf").is_ok());
    }

    #[test]
    fn test_one_byte_over_limit_rejected() {
        let result = doc(MAX_DOCUMENT_BYTES + 1, "application/pdf");
        assert!(matches!(result, Err(ClaimError::InvalidDocument(_))));
    }

    #[test]
    fn test_empty_file_rejected() {
        let result = doc(0, "application/pdf");
        assert!(matches!(result, Err(ClaimError::InvalidDocument(_))));
    }

    #[test]
    fn test_disallowed_content_type_rejected() {
        let result = doc(1024, "application/x-msdownload");
        assert!(matches!(result, Err(ClaimError::InvalidDocument(_))));

        let result = doc(1024, "text/html");
        assert!(matches!(result, Err(ClaimError::InvalidDocument(_))));
    }

    #[test]
    fn test_blank_file_name_rejected() {
        let result = ClaimDocument::new(
            ClaimId::new(),
            "   ",
            "image/png",
            1024,
            "claims/x.png",
        );
        assert!(matches!(result, Err(ClaimError::InvalidDocument(_))));
    }
}
