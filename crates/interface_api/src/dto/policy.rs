//! Policy DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_policy::{Endorsement, Policy};
use partner_gateway::{ExportReceipt, RegistrationRecord};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    /// Optional explicit policy number; generated when omitted
    #[validate(length(min = 6, max = 32))]
    pub policy_number: Option<String>,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub owner_id: Uuid,
    /// ISO 4217 code; defaults to USD
    pub currency: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub coverages: Vec<CoverageRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CoverageRequest {
    #[validate(length(min = 1, max = 64))]
    pub coverage_type: String,
    pub limit: Decimal,
    pub deductible: Decimal,
    pub premium: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TerminatePolicyRequest {
    pub termination_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PolicyListQuery {
    pub status: Option<String>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEndorsementRequest {
    #[validate(length(min = 1, max = 256))]
    pub description: String,
    pub premium_adjustment: Decimal,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VehicleVerificationRequest {
    #[validate(length(min = 2, max = 8))]
    pub plate: String,
    #[validate(length(equal = 2))]
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CoverageResponse {
    pub id: Uuid,
    pub coverage_type: String,
    pub limit: Decimal,
    pub deductible: Decimal,
    pub premium: Decimal,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct EndorsementResponse {
    pub id: Uuid,
    pub endorsement_number: String,
    pub description: String,
    pub premium_adjustment: Decimal,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: String,
}

impl From<&Endorsement> for EndorsementResponse {
    fn from(endorsement: &Endorsement) -> Self {
        Self {
            id: *endorsement.id.as_uuid(),
            endorsement_number: endorsement.endorsement_number.clone(),
            description: endorsement.description.clone(),
            premium_adjustment: endorsement.premium_adjustment.amount(),
            effective_date: endorsement.period.effective_date(),
            expiry_date: endorsement.period.expiry_date(),
            status: endorsement.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub policy_number: String,
    pub status: String,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub owner_id: Uuid,
    pub currency: String,
    pub total_premium: Decimal,
    pub coverages: Vec<CoverageResponse>,
    pub endorsements: Vec<EndorsementResponse>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl PolicyResponse {
    /// Builds a response from the aggregate, deriving the premium
    pub fn from_policy(policy: &Policy) -> Result<Self, ApiError> {
        let premium = policy.premium()?;

        Ok(Self {
            id: *policy.id().as_uuid(),
            policy_number: policy.policy_number().to_string(),
            status: policy.status().to_string(),
            effective_date: policy.period().effective_date(),
            expiry_date: policy.period().expiry_date(),
            owner_id: *policy.owner_id().as_uuid(),
            currency: policy.currency().code().to_string(),
            total_premium: premium.total.amount(),
            coverages: policy
                .coverages()
                .iter()
                .map(|c| CoverageResponse {
                    id: *c.id.as_uuid(),
                    coverage_type: c.coverage_type.to_string(),
                    limit: c.limit.amount(),
                    deductible: c.deductible.amount(),
                    premium: c.premium.amount(),
                    status: c.status.to_string(),
                })
                .collect(),
            endorsements: policy.endorsements().iter().map(Into::into).collect(),
            version: policy.version(),
            created_at: policy.created_at(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub reference: String,
    pub status: String,
}

impl From<ExportReceipt> for ExportResponse {
    fn from(receipt: ExportReceipt) -> Self {
        Self {
            reference: receipt.reference,
            status: format!("{:?}", receipt.status).to_lowercase(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleVerificationResponse {
    pub vin: String,
    pub registered_owner: String,
    pub status: String,
    pub expires: NaiveDate,
}

impl From<RegistrationRecord> for VehicleVerificationResponse {
    fn from(record: RegistrationRecord) -> Self {
        Self {
            vin: record.vin,
            registered_owner: record.registered_owner,
            status: record.status,
            expires: record.expires,
        }
    }
}
