//! Partner gateway
//!
//! Thin REST clients for the four partner systems the umbrella application
//! consumes:
//!
//! - **CLUE Property** - comprehensive loss history reports
//! - **PolicySTAR** - downstream policy administration export
//! - **RMV** - vehicle registration lookups
//! - **SpeedPay** - claim disbursements
//!
//! Each partner is consumed through a port trait so the application services
//! never see a concrete client. Every client shares the same transport
//! behavior: an API-key header, a fixed request timeout, a fixed-attempt
//! retry applied only to transient failures, and a circuit breaker. Partner
//! failures surface as [`core_kernel::PortError`]; nothing here retries
//! business rejections.

pub mod config;
pub mod client;
pub mod ports;
pub mod clue;
pub mod policystar;
pub mod rmv;
pub mod speedpay;

pub use config::{PartnerConfig, PartnerSettings};
pub use client::RestClient;
pub use ports::{
    DisbursementReceipt, DisbursementRequest, DisbursementStatus, ExportReceipt, ExportStatus,
    LossHistoryEntry, LossHistoryProvider, LossHistoryReport, LossHistoryRequest, PaymentGateway,
    PolicyExportRequest, PolicyExporter, RegistrationQuery, RegistrationRecord, VehicleRegistry,
};
pub use clue::ClueClient;
pub use policystar::PolicyStarClient;
pub use rmv::RmvClient;
pub use speedpay::SpeedPayClient;
