//! Claim application service

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use core_kernel::{ClaimId, Money, PaymentId, PolicyId};
use domain_claims::{Claim, ClaimDocument, ClaimPayment, ClaimStatus, PaymentMethod, PaymentStatus};
use infra_db::{ClaimRepository, IntegrationAuditRepository, NewAuditRecord, PolicyRepository};
use partner_gateway::{
    DisbursementRequest, DisbursementStatus, LossHistoryProvider, LossHistoryReport,
    LossHistoryRequest, PaymentGateway,
};

use crate::dto::claims::{
    LossHistoryRequestDto, OpenClaimRequest, ProcessPaymentRequest, UploadDocumentRequest,
};
use crate::error::ApiError;

/// Orchestrates claim lifecycle operations
#[derive(Clone)]
pub struct ClaimService {
    claims: ClaimRepository,
    policies: PolicyRepository,
    audit: IntegrationAuditRepository,
    payments: Arc<dyn PaymentGateway>,
    loss_history: Arc<dyn LossHistoryProvider>,
}

impl ClaimService {
    pub fn new(
        claims: ClaimRepository,
        policies: PolicyRepository,
        audit: IntegrationAuditRepository,
        payments: Arc<dyn PaymentGateway>,
        loss_history: Arc<dyn LossHistoryProvider>,
    ) -> Self {
        Self {
            claims,
            policies,
            audit,
            payments,
            loss_history,
        }
    }

    /// Opens a claim against an active policy
    pub async fn open(&self, request: OpenClaimRequest) -> Result<Claim, ApiError> {
        let policy = self
            .policies
            .fetch(PolicyId::from(request.policy_id))
            .await?;
        if !policy.is_active() {
            return Err(ApiError::Validation(format!(
                "claims may only be opened against active policies, policy is {}",
                policy.status()
            )));
        }

        let reported_date = request.reported_date.unwrap_or_else(|| Utc::now().date_naive());
        let claim = Claim::open(
            policy.id(),
            request.incident_date,
            reported_date,
            Money::new(request.amount, policy.currency()),
            request.description,
        )?;

        self.claims.insert(&claim).await?;
        info!(claim_number = %claim.claim_number, policy_number = %policy.policy_number(), "claim opened");
        Ok(claim)
    }

    /// Fetches a claim by id
    pub async fn get(&self, id: Uuid) -> Result<Claim, ApiError> {
        Ok(self.claims.fetch(ClaimId::from(id)).await?)
    }

    /// Lists claims with optional filters
    pub async fn list(
        &self,
        status: Option<String>,
        policy_id: Option<Uuid>,
    ) -> Result<Vec<Claim>, ApiError> {
        let status = status
            .map(|s| s.parse::<ClaimStatus>())
            .transpose()
            .map_err(ApiError::BadRequest)?;
        Ok(self
            .claims
            .list(status, policy_id.map(PolicyId::from))
            .await?)
    }

    /// Moves a claim along the forward-only status table
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Claim, ApiError> {
        let target: ClaimStatus = status.parse().map_err(ApiError::BadRequest)?;

        let mut claim = self.claims.fetch(ClaimId::from(id)).await?;
        claim.update_status(target)?;
        self.claims.update(&mut claim).await?;
        Ok(claim)
    }

    /// Validates and attaches a document to a claim
    pub async fn upload_document(
        &self,
        id: Uuid,
        request: UploadDocumentRequest,
    ) -> Result<ClaimDocument, ApiError> {
        let mut claim = self.claims.fetch(ClaimId::from(id)).await?;

        let storage_location = format!("claims/{}/{}", claim.claim_number, request.file_name);
        let document = ClaimDocument::new(
            claim.id,
            request.file_name,
            request.content_type,
            request.size_bytes,
            storage_location,
        )?;

        self.claims.add_document(&mut claim, &document).await?;
        claim.add_document(document.clone());
        Ok(document)
    }

    /// Disburses claim money through the payment partner
    ///
    /// The amount is validated against the remaining payable before the
    /// partner is called. A completed receipt advances the paid amount; a
    /// processing receipt is recorded without advancing it; a partner
    /// failure leaves the claim untouched.
    pub async fn process_payment(
        &self,
        id: Uuid,
        request: ProcessPaymentRequest,
    ) -> Result<ClaimPayment, ApiError> {
        let method: PaymentMethod = request.method.parse().map_err(ApiError::BadRequest)?;

        let mut claim = self.claims.fetch(ClaimId::from(id)).await?;
        let amount = Money::new(request.amount, claim.currency);
        claim.check_payment_amount(amount)?;

        let reference = PaymentId::new_v7().to_string();
        let disbursement = DisbursementRequest {
            claim_number: claim.claim_number.clone(),
            amount: amount.amount(),
            currency: claim.currency.code().to_string(),
            method: method.to_string(),
            reference: reference.clone(),
        };

        let started = Instant::now();
        let result = self.payments.submit_disbursement(disbursement).await;
        self.record_audit(
            "speedpay",
            "submit_disbursement",
            Some(claim.claim_number.clone()),
            &result,
            started,
        )
        .await;

        let receipt = result?;
        let mut payment = ClaimPayment::new(claim.id, receipt.transaction_id, amount, method)?;

        match receipt.status {
            DisbursementStatus::Completed => {
                payment.complete()?;
                claim.apply_payment(payment.clone())?;
                self.claims.record_payment(&mut claim, &payment).await?;
                info!(
                    claim_number = %claim.claim_number,
                    transaction_id = %payment.transaction_id,
                    "payment completed"
                );
                Ok(payment)
            }
            DisbursementStatus::Processing => {
                payment.update_status(PaymentStatus::Processing)?;
                claim.record_payment_attempt(payment.clone());
                self.claims.record_payment(&mut claim, &payment).await?;
                Ok(payment)
            }
            DisbursementStatus::Declined => {
                warn!(claim_number = %claim.claim_number, "payment declined by partner");
                Err(ApiError::Validation(
                    "payment declined by partner".to_string(),
                ))
            }
        }
    }

    /// Orders a loss history report for the property behind a claim
    pub async fn order_loss_history(
        &self,
        id: Uuid,
        request: LossHistoryRequestDto,
    ) -> Result<LossHistoryReport, ApiError> {
        let claim = self.claims.fetch(ClaimId::from(id)).await?;

        let partner_request = LossHistoryRequest {
            claim_number: claim.claim_number.clone(),
            property_address: request.property_address,
            years: request.years,
        };
        let started = Instant::now();
        let result = self.loss_history.order_report(partner_request).await;
        self.record_audit(
            "clue",
            "order_report",
            Some(claim.claim_number.clone()),
            &result,
            started,
        )
        .await;

        Ok(result?)
    }

    async fn record_audit<T>(
        &self,
        partner: &str,
        operation: &str,
        reference: Option<String>,
        result: &Result<T, core_kernel::PortError>,
        started: Instant,
    ) {
        let record = NewAuditRecord {
            partner: partner.to_string(),
            operation: operation.to_string(),
            reference,
            success: result.is_ok(),
            message: result.as_ref().err().map(|e| e.to_string()),
            latency_ms: started.elapsed().as_millis() as i64,
        };
        if let Err(e) = self.audit.record(record).await {
            error!(partner, operation, error = %e, "failed to write integration audit record");
        }
    }
}
