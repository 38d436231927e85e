//! Core Kernel - Foundational types and utilities for the umbrella system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Policy period handling with term-length rules
//! - Common identifiers and value objects
//! - Port/adapter infrastructure for partner integrations

pub mod money;
pub mod period;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use period::{PolicyPeriod, PeriodError, MAX_TERM_MONTHS};
pub use identifiers::{
    PolicyId, CoverageId, EndorsementId,
    ClaimId, DocumentId, PaymentId,
    UserId, RoleId, AuditRecordId,
};
pub use ports::{
    PortError, DomainPort, RetryPolicy, CircuitBreakerConfig,
    HealthCheckable, HealthCheckResult, AdapterHealth,
};
