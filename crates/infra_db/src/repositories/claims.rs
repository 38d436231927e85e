//! Claim repository
//!
//! Persists the Claim aggregate across the claims, claim_documents, and
//! claim_payments tables. Documents and payments are append-only; the claim
//! row itself is version-guarded, and every append bumps the claim version
//! so concurrent writers collide on save.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, DocumentId, Money, PaymentId, PolicyId};
use domain_claims::{Claim, ClaimDocument, ClaimPayment, ClaimStatus, PaymentMethod, PaymentStatus};

use crate::error::DatabaseError;

/// Repository for Claim aggregates
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    claim_id: Uuid,
    claim_number: String,
    policy_id: Uuid,
    status: String,
    incident_date: NaiveDate,
    reported_date: NaiveDate,
    description: Option<String>,
    claim_amount: Decimal,
    paid_amount: Decimal,
    currency: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    document_id: Uuid,
    claim_id: Uuid,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    storage_location: String,
    uploaded_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    payment_id: Uuid,
    claim_id: Uuid,
    transaction_id: String,
    amount: Decimal,
    method: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const CLAIM_COLUMNS: &str = "claim_id, claim_number, policy_id, status, incident_date, \
     reported_date, description, claim_amount, paid_amount, currency, version, \
     created_at, updated_at";

const DOCUMENT_COLUMNS: &str =
    "document_id, claim_id, file_name, content_type, size_bytes, storage_location, uploaded_at";

const PAYMENT_COLUMNS: &str =
    "payment_id, claim_id, transaction_id, amount, method, status, created_at, updated_at";

impl ClaimRepository {
    /// Creates a new ClaimRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly opened claim
    pub async fn insert(&self, claim: &Claim) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO claims (claim_id, claim_number, policy_id, status, incident_date, \
             reported_date, description, claim_amount, paid_amount, currency, version, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(claim.id.as_uuid())
        .bind(&claim.claim_number)
        .bind(claim.policy_id.as_uuid())
        .bind(claim.status.to_string())
        .bind(claim.incident_date)
        .bind(claim.reported_date)
        .bind(&claim.description)
        .bind(claim.claim_amount.amount())
        .bind(claim.paid_amount.amount())
        .bind(claim.currency.code())
        .bind(claim.version)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }

    /// Fetches a claim with its documents and payments
    pub async fn fetch(&self, claim_id: ClaimId) -> Result<Claim, DatabaseError> {
        let row: Option<ClaimRow> = sqlx::query_as(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1"
        ))
        .bind(claim_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("Claim", claim_id))?;
        self.hydrate(row).await
    }

    /// Lists claims, optionally filtered by status and policy
    pub async fn list(
        &self,
        status: Option<ClaimStatus>,
        policy_id: Option<PolicyId>,
    ) -> Result<Vec<Claim>, DatabaseError> {
        let rows: Vec<ClaimRow> = sqlx::query_as(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::UUID IS NULL OR policy_id = $2) \
             ORDER BY created_at DESC",
        ))
        .bind(status.map(|s| s.to_string()))
        .bind(policy_id.map(|p| *p.as_uuid()))
        .fetch_all(&self.pool)
        .await?;

        let mut claims = Vec::with_capacity(rows.len());
        for row in rows {
            claims.push(self.hydrate(row).await?);
        }
        Ok(claims)
    }

    /// Saves the claim row after a status or amount mutation
    ///
    /// On success the aggregate's version is advanced to match the row.
    pub async fn update(&self, claim: &mut Claim) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE claims SET status = $1, paid_amount = $2, version = version + 1, \
             updated_at = $3 WHERE claim_id = $4 AND version = $5",
        )
        .bind(claim.status.to_string())
        .bind(claim.paid_amount.amount())
        .bind(Utc::now())
        .bind(claim.id.as_uuid())
        .bind(claim.version)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(claim.id).await);
        }
        claim.version += 1;
        Ok(())
    }

    /// Appends a document and bumps the claim version
    pub async fn add_document(
        &self,
        claim: &mut Claim,
        document: &ClaimDocument,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE claims SET version = version + 1, updated_at = $1 \
             WHERE claim_id = $2 AND version = $3",
        )
        .bind(Utc::now())
        .bind(claim.id.as_uuid())
        .bind(claim.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(claim.id).await);
        }

        sqlx::query(
            "INSERT INTO claim_documents (document_id, claim_id, file_name, content_type, \
             size_bytes, storage_location, uploaded_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(document.id.as_uuid())
        .bind(claim.id.as_uuid())
        .bind(&document.file_name)
        .bind(&document.content_type)
        .bind(document.size_bytes as i64)
        .bind(&document.storage_location)
        .bind(document.uploaded_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        tx.commit().await?;
        claim.version += 1;
        Ok(())
    }

    /// Records a payment and saves the claim's paid amount and status
    ///
    /// One transaction: the payment row appears iff the claim row advanced.
    pub async fn record_payment(
        &self,
        claim: &mut Claim,
        payment: &ClaimPayment,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE claims SET status = $1, paid_amount = $2, version = version + 1, \
             updated_at = $3 WHERE claim_id = $4 AND version = $5",
        )
        .bind(claim.status.to_string())
        .bind(claim.paid_amount.amount())
        .bind(Utc::now())
        .bind(claim.id.as_uuid())
        .bind(claim.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(claim.id).await);
        }

        sqlx::query(
            "INSERT INTO claim_payments (payment_id, claim_id, transaction_id, amount, \
             method, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(payment.id.as_uuid())
        .bind(claim.id.as_uuid())
        .bind(&payment.transaction_id)
        .bind(payment.amount.amount())
        .bind(payment.method.to_string())
        .bind(payment.status.to_string())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        tx.commit().await?;
        claim.version += 1;
        Ok(())
    }

    async fn stale_or_missing(&self, claim_id: ClaimId) -> DatabaseError {
        let exists: Result<Option<(i64,)>, sqlx::Error> =
            sqlx::query_as("SELECT version FROM claims WHERE claim_id = $1")
                .bind(claim_id.as_uuid())
                .fetch_optional(&self.pool)
                .await;
        match exists {
            Ok(Some(_)) => DatabaseError::stale("Claim", claim_id),
            Ok(None) => DatabaseError::not_found("Claim", claim_id),
            Err(e) => DatabaseError::from(&e),
        }
    }

    async fn hydrate(&self, row: ClaimRow) -> Result<Claim, DatabaseError> {
        let document_rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM claim_documents \
             WHERE claim_id = $1 ORDER BY uploaded_at ASC"
        ))
        .bind(row.claim_id)
        .fetch_all(&self.pool)
        .await?;

        let payment_rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM claim_payments \
             WHERE claim_id = $1 ORDER BY created_at ASC"
        ))
        .bind(row.claim_id)
        .fetch_all(&self.pool)
        .await?;

        map_claim(row, document_rows, payment_rows)
    }
}

fn map_claim(
    row: ClaimRow,
    document_rows: Vec<DocumentRow>,
    payment_rows: Vec<PaymentRow>,
) -> Result<Claim, DatabaseError> {
    let status: ClaimStatus = row
        .status
        .parse()
        .map_err(|_| DatabaseError::bad_value("claims.status", &row.status))?;
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|_| DatabaseError::bad_value("claims.currency", &row.currency))?;

    let documents = document_rows
        .into_iter()
        .map(map_document)
        .collect::<Result<Vec<_>, _>>()?;
    let payments = payment_rows
        .into_iter()
        .map(|p| map_payment(p, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Claim {
        id: ClaimId::from(row.claim_id),
        claim_number: row.claim_number,
        policy_id: PolicyId::from(row.policy_id),
        status,
        incident_date: row.incident_date,
        reported_date: row.reported_date,
        description: row.description,
        claim_amount: Money::new(row.claim_amount, currency),
        paid_amount: Money::new(row.paid_amount, currency),
        currency,
        documents,
        payments,
        version: row.version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_document(row: DocumentRow) -> Result<ClaimDocument, DatabaseError> {
    Ok(ClaimDocument {
        id: DocumentId::from(row.document_id),
        claim_id: ClaimId::from(row.claim_id),
        file_name: row.file_name,
        content_type: row.content_type,
        size_bytes: row.size_bytes as u64,
        storage_location: row.storage_location,
        uploaded_at: row.uploaded_at,
    })
}

fn map_payment(row: PaymentRow, currency: Currency) -> Result<ClaimPayment, DatabaseError> {
    let status: PaymentStatus = row
        .status
        .parse()
        .map_err(|_| DatabaseError::bad_value("claim_payments.status", &row.status))?;
    let method: PaymentMethod = row
        .method
        .parse()
        .map_err(|_| DatabaseError::bad_value("claim_payments.method", &row.method))?;

    Ok(ClaimPayment {
        id: PaymentId::from(row.payment_id),
        claim_id: ClaimId::from(row.claim_id),
        transaction_id: row.transaction_id,
        amount: Money::new(row.amount, currency),
        method,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
