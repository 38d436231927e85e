//! Policy application service

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};
use uuid::Uuid;

use core_kernel::{Currency, EndorsementId, Money, PolicyId, PolicyPeriod, UserId};
use domain_policy::{Coverage, CoverageType, Endorsement, Policy, PolicyBuilder, PolicyStatus};
use infra_db::{IntegrationAuditRepository, NewAuditRecord, PolicyRepository};
use partner_gateway::{
    ExportReceipt, PolicyExportRequest, PolicyExporter, RegistrationQuery, RegistrationRecord,
    VehicleRegistry,
};

use crate::dto::policy::{
    CreateEndorsementRequest, CreatePolicyRequest, UpdatePolicyRequest, VehicleVerificationRequest,
};
use crate::error::ApiError;

/// Orchestrates policy lifecycle operations
#[derive(Clone)]
pub struct PolicyService {
    policies: PolicyRepository,
    audit: IntegrationAuditRepository,
    exporter: Arc<dyn PolicyExporter>,
    registry: Arc<dyn VehicleRegistry>,
}

impl PolicyService {
    pub fn new(
        policies: PolicyRepository,
        audit: IntegrationAuditRepository,
        exporter: Arc<dyn PolicyExporter>,
        registry: Arc<dyn VehicleRegistry>,
    ) -> Self {
        Self {
            policies,
            audit,
            exporter,
            registry,
        }
    }

    /// Creates a policy in Draft status
    pub async fn create(&self, request: CreatePolicyRequest) -> Result<Policy, ApiError> {
        let currency = parse_currency(request.currency.as_deref())?;
        let period = PolicyPeriod::new(request.effective_date, request.expiry_date)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let mut builder = PolicyBuilder::new()
            .owner(UserId::from(request.owner_id))
            .period(period)
            .currency(currency);
        if let Some(number) = request.policy_number {
            builder = builder.policy_number(number);
        }
        for coverage in request.coverages {
            let coverage_type: CoverageType = coverage
                .coverage_type
                .parse()
                .map_err(ApiError::BadRequest)?;
            builder = builder.add_coverage(Coverage::new(
                coverage_type,
                Money::new(coverage.limit, currency),
                Money::new(coverage.deductible, currency),
                Money::new(coverage.premium, currency),
            )?);
        }

        let mut policy = builder.build()?;
        self.policies.insert(&policy).await?;
        log_events(&mut policy);
        Ok(policy)
    }

    /// Fetches a policy by id
    pub async fn get(&self, id: Uuid) -> Result<Policy, ApiError> {
        Ok(self.policies.fetch(PolicyId::from(id)).await?)
    }

    /// Lists policies with optional filters
    pub async fn list(
        &self,
        status: Option<String>,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Policy>, ApiError> {
        let status = status
            .map(|s| s.parse::<PolicyStatus>())
            .transpose()
            .map_err(ApiError::BadRequest)?;
        Ok(self
            .policies
            .list(status, owner_id.map(UserId::from))
            .await?)
    }

    /// Updates mutable policy fields
    ///
    /// Terminated policies reject the update inside the aggregate; a stale
    /// version surfaces as Conflict from the repository.
    pub async fn update(&self, id: Uuid, request: UpdatePolicyRequest) -> Result<Policy, ApiError> {
        let mut policy = self.policies.fetch(PolicyId::from(id)).await?;

        let period = match (request.effective_date, request.expiry_date) {
            (None, None) => None,
            (effective, expiry) => Some(
                PolicyPeriod::new(
                    effective.unwrap_or_else(|| policy.period().effective_date()),
                    expiry.unwrap_or_else(|| policy.period().expiry_date()),
                )
                .map_err(|e| ApiError::Validation(e.to_string()))?,
            ),
        };

        policy.update_details(period, request.owner_id.map(UserId::from))?;
        Ok(self.policies.update(&policy).await?)
    }

    /// Activates a draft policy
    pub async fn activate(&self, id: Uuid) -> Result<Policy, ApiError> {
        let mut policy = self.policies.fetch(PolicyId::from(id)).await?;
        policy.activate()?;
        let updated = self.policies.update(&policy).await?;
        log_events(&mut policy);
        Ok(updated)
    }

    /// Terminates an active policy mid-term
    pub async fn terminate(
        &self,
        id: Uuid,
        termination_date: chrono::NaiveDate,
    ) -> Result<Policy, ApiError> {
        let mut policy = self.policies.fetch(PolicyId::from(id)).await?;
        policy.terminate(termination_date)?;
        let updated = self.policies.update(&policy).await?;
        log_events(&mut policy);
        Ok(updated)
    }

    /// Exports an active policy to the downstream administration partner
    ///
    /// The partner applies exports asynchronously; its reported status is
    /// returned to the caller as-is. Failures are not retried here - the
    /// gateway already applied its fixed-attempt retry.
    pub async fn export(&self, id: Uuid) -> Result<ExportReceipt, ApiError> {
        let policy = self.policies.fetch(PolicyId::from(id)).await?;
        if !policy.is_active() {
            return Err(ApiError::Validation(format!(
                "only active policies can be exported, policy is {}",
                policy.status()
            )));
        }

        let premium = policy.premium()?;
        let request = PolicyExportRequest {
            policy_number: policy.policy_number().to_string(),
            status: policy.status().to_string(),
            effective_date: policy.period().effective_date(),
            expiry_date: policy.period().expiry_date(),
            total_premium: premium.total.amount(),
            currency: policy.currency().code().to_string(),
        };

        let started = Instant::now();
        let result = self.exporter.export_policy(request).await;
        self.record_audit(
            "policystar",
            "export_policy",
            Some(policy.policy_number().to_string()),
            &result,
            started,
        )
        .await;

        let receipt = result?;
        info!(
            policy_number = %policy.policy_number(),
            reference = %receipt.reference,
            status = ?receipt.status,
            "policy exported"
        );
        Ok(receipt)
    }

    /// Attaches a draft endorsement to a policy
    pub async fn add_endorsement(
        &self,
        id: Uuid,
        request: CreateEndorsementRequest,
        requested_by: &str,
    ) -> Result<(Policy, EndorsementId), ApiError> {
        let mut policy = self.policies.fetch(PolicyId::from(id)).await?;

        let period = PolicyPeriod::new(request.effective_date, request.expiry_date)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let endorsement = Endorsement::new(
            request.description,
            Money::new(request.premium_adjustment, policy.currency()),
            period,
        )
        .requested_by(requested_by);
        let endorsement_id = endorsement.id;

        policy.add_endorsement(endorsement)?;
        let updated = self.policies.update(&policy).await?;
        log_events(&mut policy);
        Ok((updated, endorsement_id))
    }

    /// Approves an attached endorsement
    pub async fn approve_endorsement(
        &self,
        id: Uuid,
        endorsement_id: Uuid,
        approver: &str,
    ) -> Result<Policy, ApiError> {
        let mut policy = self.policies.fetch(PolicyId::from(id)).await?;
        policy.approve_endorsement(EndorsementId::from(endorsement_id), approver)?;
        let updated = self.policies.update(&policy).await?;
        log_events(&mut policy);
        Ok(updated)
    }

    /// Verifies a vehicle registration with the RMV
    ///
    /// Used when an excess-auto coverage is attached; the policy must exist
    /// but the lookup itself is read-only.
    pub async fn verify_vehicle(
        &self,
        id: Uuid,
        request: VehicleVerificationRequest,
    ) -> Result<RegistrationRecord, ApiError> {
        let policy = self.policies.fetch(PolicyId::from(id)).await?;

        let query = RegistrationQuery {
            plate: request.plate,
            state: request.state,
        };
        let started = Instant::now();
        let result = self.registry.lookup_registration(query).await;
        self.record_audit(
            "rmv",
            "lookup_registration",
            Some(policy.policy_number().to_string()),
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

fn parse_currency(code: Option<&str>) -> Result<Currency, ApiError> {
    code.unwrap_or("USD")
        .parse::<Currency>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn log_events(policy: &mut Policy) {
    for event in policy.take_events() {
        info!(event = event.name(), policy_id = %policy.id(), "policy event");
    }
}
