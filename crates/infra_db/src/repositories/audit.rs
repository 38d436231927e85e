//! Integration audit repository
//!
//! One row per outbound partner call, success or failure. Written by the
//! application services after each call; never read on a request path.

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::AuditRecordId;

use crate::error::DatabaseError;

/// A partner call to be recorded
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    /// Partner name: "clue", "policystar", "rmv", or "speedpay"
    pub partner: String,
    /// Operation performed, e.g. "export_policy"
    pub operation: String,
    /// Business reference (policy number, claim number, transaction id)
    pub reference: Option<String>,
    pub success: bool,
    /// Error message when the call failed
    pub message: Option<String>,
    pub latency_ms: i64,
}

/// Repository for integration audit records
#[derive(Debug, Clone)]
pub struct IntegrationAuditRepository {
    pool: PgPool,
}

impl IntegrationAuditRepository {
    /// Creates a new IntegrationAuditRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a partner call
    pub async fn record(&self, record: NewAuditRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO integration_audit (audit_id, partner, operation, reference, \
             success, message, latency_ms, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(AuditRecordId::new_v7().as_uuid())
        .bind(&record.partner)
        .bind(&record.operation)
        .bind(&record.reference)
        .bind(record.success)
        .bind(&record.message)
        .bind(record.latency_ms)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }
}
