//! Partner port traits
//!
//! Application services depend on these traits, never on the concrete
//! clients, so a partner can be swapped for a stub in tests or replaced
//! wholesale without touching the services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

/// Request to disburse claim money through the payment partner
#[derive(Debug, Clone, Serialize)]
pub struct DisbursementRequest {
    pub claim_number: String,
    pub amount: Decimal,
    pub currency: String,
    /// Disbursement channel: "ach", "debit_card", or "check"
    pub method: String,
    /// Idempotency reference supplied by this system
    pub reference: String,
}

/// Outcome reported by the payment partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementStatus {
    /// Funds moved
    Completed,
    /// Accepted, settlement pending
    Processing,
    /// Refused by the partner
    Declined,
}

/// Receipt for a submitted disbursement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementReceipt {
    /// Transaction id assigned by the partner; unique per disbursement
    pub transaction_id: String,
    pub status: DisbursementStatus,
    pub processed_at: DateTime<Utc>,
}

/// Port for the payment partner (SpeedPay)
#[async_trait]
pub trait PaymentGateway: DomainPort {
    /// Submits a disbursement and returns the partner's receipt
    async fn submit_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<DisbursementReceipt, PortError>;
}

/// Snapshot of a policy sent to the downstream administration system
#[derive(Debug, Clone, Serialize)]
pub struct PolicyExportRequest {
    pub policy_number: String,
    pub status: String,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub total_premium: Decimal,
    pub currency: String,
}

/// Export processing status reported by the partner
///
/// The partner processes exports asynchronously; Accepted means queued on
/// their side, Completed means already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    Accepted,
    Completed,
    Failed,
}

/// Receipt for a policy export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Partner-side reference for the export
    pub reference: String,
    pub status: ExportStatus,
}

/// Port for the policy administration partner (PolicySTAR)
#[async_trait]
pub trait PolicyExporter: DomainPort {
    /// Pushes a policy snapshot downstream
    async fn export_policy(&self, request: PolicyExportRequest) -> Result<ExportReceipt, PortError>;
}

/// Request for a comprehensive loss history report
#[derive(Debug, Clone, Serialize)]
pub struct LossHistoryRequest {
    pub claim_number: String,
    pub property_address: String,
    /// Years of history requested
    pub years: u8,
}

/// One prior loss on the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossHistoryEntry {
    pub loss_date: NaiveDate,
    pub loss_type: String,
    pub amount_paid: Decimal,
}

/// A loss history report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossHistoryReport {
    pub reference: String,
    pub entries: Vec<LossHistoryEntry>,
}

/// Port for the loss history partner (CLUE Property)
#[async_trait]
pub trait LossHistoryProvider: DomainPort {
    /// Orders a loss history report for a property
    async fn order_report(&self, request: LossHistoryRequest)
        -> Result<LossHistoryReport, PortError>;
}

/// Vehicle registration lookup query
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationQuery {
    pub plate: String,
    /// Two-letter state code
    pub state: String,
}

/// A vehicle registration record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub vin: String,
    pub registered_owner: String,
    /// Registration status as reported by the registry
    pub status: String,
    pub expires: NaiveDate,
}

/// Port for the motor vehicle registry partner (RMV)
#[async_trait]
pub trait VehicleRegistry: DomainPort {
    /// Looks up a registration by plate and state
    async fn lookup_registration(
        &self,
        query: RegistrationQuery,
    ) -> Result<RegistrationRecord, PortError>;
}

/// In-memory mock ports for testing without HTTP
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// How a mock partner behaves
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockBehavior {
        /// Every call succeeds
        Succeed,
        /// Every call fails with ServiceUnavailable
        Unavailable,
    }

    /// Mock payment gateway with a scripted outcome
    #[derive(Debug)]
    pub struct MockPaymentGateway {
        behavior: MockBehavior,
        outcome: DisbursementStatus,
        calls: AtomicU64,
    }

    impl MockPaymentGateway {
        /// A gateway that completes every disbursement
        pub fn completing() -> Self {
            Self {
                behavior: MockBehavior::Succeed,
                outcome: DisbursementStatus::Completed,
                calls: AtomicU64::new(0),
            }
        }

        /// A gateway that declines every disbursement
        pub fn declining() -> Self {
            Self {
                behavior: MockBehavior::Succeed,
                outcome: DisbursementStatus::Declined,
                calls: AtomicU64::new(0),
            }
        }

        /// A gateway that is down
        pub fn unavailable() -> Self {
            Self {
                behavior: MockBehavior::Unavailable,
                outcome: DisbursementStatus::Completed,
                calls: AtomicU64::new(0),
            }
        }

        /// Number of calls received
        pub fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl DomainPort for MockPaymentGateway {}

    #[async_trait]
    impl PaymentGateway for MockPaymentGateway {
        async fn submit_disbursement(
            &self,
            request: DisbursementRequest,
        ) -> Result<DisbursementReceipt, PortError> {
            let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
            match self.behavior {
                MockBehavior::Unavailable => Err(PortError::unavailable("speedpay")),
                MockBehavior::Succeed => Ok(DisbursementReceipt {
                    transaction_id: format!("SP-MOCK-{}-{}", request.reference, call),
                    status: self.outcome,
                    processed_at: Utc::now(),
                }),
            }
        }
    }

    /// Mock policy exporter
    #[derive(Debug)]
    pub struct MockPolicyExporter {
        behavior: MockBehavior,
        status: ExportStatus,
        calls: AtomicU64,
    }

    impl MockPolicyExporter {
        pub fn accepting() -> Self {
            Self {
                behavior: MockBehavior::Succeed,
                status: ExportStatus::Accepted,
                calls: AtomicU64::new(0),
            }
        }

        pub fn unavailable() -> Self {
            Self {
                behavior: MockBehavior::Unavailable,
                status: ExportStatus::Failed,
                calls: AtomicU64::new(0),
            }
        }

        pub fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl DomainPort for MockPolicyExporter {}

    #[async_trait]
    impl PolicyExporter for MockPolicyExporter {
        async fn export_policy(
            &self,
            request: PolicyExportRequest,
        ) -> Result<ExportReceipt, PortError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match self.behavior {
                MockBehavior::Unavailable => Err(PortError::unavailable("policystar")),
                MockBehavior::Succeed => Ok(ExportReceipt {
                    reference: format!("PSTAR-{}", request.policy_number),
                    status: self.status,
                }),
            }
        }
    }

    /// Mock loss history provider returning a fixed report
    #[derive(Debug, Default)]
    pub struct MockLossHistoryProvider {
        entries: Vec<LossHistoryEntry>,
    }

    impl MockLossHistoryProvider {
        pub fn with_entries(entries: Vec<LossHistoryEntry>) -> Self {
            Self { entries }
        }
    }

    impl DomainPort for MockLossHistoryProvider {}

    #[async_trait]
    impl LossHistoryProvider for MockLossHistoryProvider {
        async fn order_report(
            &self,
            request: LossHistoryRequest,
        ) -> Result<LossHistoryReport, PortError> {
            Ok(LossHistoryReport {
                reference: format!("CLUE-{}", request.claim_number),
                entries: self.entries.clone(),
            })
        }
    }

    /// Mock vehicle registry with a single known plate
    #[derive(Debug)]
    pub struct MockVehicleRegistry {
        known_plate: String,
        record: RegistrationRecord,
    }

    impl MockVehicleRegistry {
        pub fn with_registration(plate: impl Into<String>, record: RegistrationRecord) -> Self {
            Self {
                known_plate: plate.into(),
                record,
            }
        }
    }

    impl DomainPort for MockVehicleRegistry {}

    #[async_trait]
    impl VehicleRegistry for MockVehicleRegistry {
        async fn lookup_registration(
            &self,
            query: RegistrationQuery,
        ) -> Result<RegistrationRecord, PortError> {
            if query.plate.eq_ignore_ascii_case(&self.known_plate) {
                Ok(self.record.clone())
            } else {
                Err(PortError::not_found("registration", &query.plate))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> DisbursementRequest {
        DisbursementRequest {
            claim_number: "CLM-100".to_string(),
            amount: dec!(600),
            currency: "USD".to_string(),
            method: "ach".to_string(),
            reference: "PAY-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_gateway_completes() {
        let gateway = MockPaymentGateway::completing();
        let receipt = gateway.submit_disbursement(request()).await.unwrap();

        assert_eq!(receipt.status, DisbursementStatus::Completed);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_gateway_unavailable() {
        let gateway = MockPaymentGateway::unavailable();
        let result = gateway.submit_disbursement(request()).await;

        assert!(matches!(result, Err(PortError::ServiceUnavailable { .. })));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_registry_lookup() {
        let registry = MockVehicleRegistry::with_registration(
            "8XK442",
            RegistrationRecord {
                vin: "1HGCM82633A004352".to_string(),
                registered_owner: "Morgan Lane".to_string(),
                status: "active".to_string(),
                expires: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            },
        );

        let hit = registry
            .lookup_registration(RegistrationQuery {
                plate: "8xk442".to_string(),
                state: "MA".to_string(),
            })
            .await;
        assert!(hit.is_ok());

        let miss = registry
            .lookup_registration(RegistrationQuery {
                plate: "OTHER".to_string(),
                state: "MA".to_string(),
            })
            .await;
        assert!(matches!(miss, Err(PortError::NotFound { .. })));
    }
}
