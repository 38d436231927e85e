//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{Claim, ClaimDocument, ClaimPayment};
use partner_gateway::LossHistoryReport;

#[derive(Debug, Deserialize)]
pub struct OpenClaimRequest {
    pub policy_id: Uuid,
    pub incident_date: NaiveDate,
    /// Defaults to today when omitted
    pub reported_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimListQuery {
    pub status: Option<String>,
    pub policy_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClaimStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 128))]
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    pub amount: Decimal,
    /// "ach", "debit_card", or "check"
    pub method: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LossHistoryRequestDto {
    #[validate(length(min = 5, max = 256))]
    pub property_address: String,
    /// Years of history; partner supports at most 7
    #[validate(range(min = 1, max = 7))]
    pub years: u8,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub storage_location: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&ClaimDocument> for DocumentResponse {
    fn from(document: &ClaimDocument) -> Self {
        Self {
            id: *document.id.as_uuid(),
            file_name: document.file_name.clone(),
            content_type: document.content_type.clone(),
            size_bytes: document.size_bytes,
            storage_location: document.storage_location.clone(),
            uploaded_at: document.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub transaction_id: String,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ClaimPayment> for PaymentResponse {
    fn from(payment: &ClaimPayment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            transaction_id: payment.transaction_id.clone(),
            amount: payment.amount.amount(),
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub claim_number: String,
    pub policy_id: Uuid,
    pub status: String,
    pub incident_date: NaiveDate,
    pub reported_date: NaiveDate,
    pub description: Option<String>,
    pub claim_amount: Decimal,
    pub paid_amount: Decimal,
    pub currency: String,
    pub documents: Vec<DocumentResponse>,
    pub payments: Vec<PaymentResponse>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            claim_number: claim.claim_number.clone(),
            policy_id: *claim.policy_id.as_uuid(),
            status: claim.status.to_string(),
            incident_date: claim.incident_date,
            reported_date: claim.reported_date,
            description: claim.description.clone(),
            claim_amount: claim.claim_amount.amount(),
            paid_amount: claim.paid_amount.amount(),
            currency: claim.currency.code().to_string(),
            documents: claim.documents.iter().map(Into::into).collect(),
            payments: claim.payments.iter().map(Into::into).collect(),
            version: claim.version,
            created_at: claim.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LossHistoryResponse {
    pub reference: String,
    pub entries: Vec<LossHistoryEntryResponse>,
}

#[derive(Debug, Serialize)]
pub struct LossHistoryEntryResponse {
    pub loss_date: NaiveDate,
    pub loss_type: String,
    pub amount_paid: Decimal,
}

impl From<LossHistoryReport> for LossHistoryResponse {
    fn from(report: LossHistoryReport) -> Self {
        Self {
            reference: report.reference,
            entries: report
                .entries
                .into_iter()
                .map(|entry| LossHistoryEntryResponse {
                    loss_date: entry.loss_date,
                    loss_type: entry.loss_type,
                    amount_paid: entry.amount_paid,
                })
                .collect(),
        }
    }
}
