//! Application services
//!
//! Services orchestrate repositories and partner ports and own the
//! cross-entity business rules; handlers stay thin. Partner calls are
//! always audited, success or failure.

pub mod policy;
pub mod claims;

use std::sync::Arc;

use partner_gateway::{LossHistoryProvider, PaymentGateway, PolicyExporter, VehicleRegistry};

/// The partner ports the services depend on
///
/// Concrete clients in production, in-memory mocks in tests.
#[derive(Clone)]
pub struct PartnerPorts {
    pub exporter: Arc<dyn PolicyExporter>,
    pub payments: Arc<dyn PaymentGateway>,
    pub loss_history: Arc<dyn LossHistoryProvider>,
    pub registry: Arc<dyn VehicleRegistry>,
}
