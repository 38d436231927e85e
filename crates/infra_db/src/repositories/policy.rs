//! Policy repository
//!
//! Persists the Policy aggregate across the policies, coverages, and
//! endorsements tables. Updates are optimistic: the aggregate's loaded
//! version must still match the row or the save fails with StaleVersion.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    CoverageId, Currency, EndorsementId, Money, PolicyId, PolicyPeriod, UserId,
};
use domain_policy::{
    Coverage, CoverageStatus, CoverageType, Endorsement, EndorsementStatus, Policy, PolicyStatus,
};

use crate::error::DatabaseError;

/// Repository for Policy aggregates
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    policy_id: Uuid,
    policy_number: String,
    status: String,
    effective_date: NaiveDate,
    expiry_date: NaiveDate,
    owner_id: Uuid,
    currency: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CoverageRow {
    coverage_id: Uuid,
    policy_id: Uuid,
    coverage_type: String,
    limit_amount: Decimal,
    deductible: Decimal,
    premium: Decimal,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct EndorsementRow {
    endorsement_id: Uuid,
    policy_id: Uuid,
    endorsement_number: String,
    description: String,
    premium_adjustment: Decimal,
    effective_date: NaiveDate,
    expiry_date: NaiveDate,
    status: String,
    requested_by: Option<String>,
    reviewed_by: Option<String>,
    review_note: Option<String>,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

const POLICY_COLUMNS: &str = "policy_id, policy_number, status, effective_date, expiry_date, \
     owner_id, currency, version, created_at, updated_at";

const COVERAGE_COLUMNS: &str =
    "coverage_id, policy_id, coverage_type, limit_amount, deductible, premium, status";

const ENDORSEMENT_COLUMNS: &str = "endorsement_id, policy_id, endorsement_number, description, \
     premium_adjustment, effective_date, expiry_date, status, requested_by, reviewed_by, \
     review_note, created_at, processed_at";

impl PolicyRepository {
    /// Creates a new PolicyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly built policy with its coverages
    pub async fn insert(&self, policy: &Policy) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO policies (policy_id, policy_number, status, effective_date, \
             expiry_date, owner_id, currency, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(policy.id().as_uuid())
        .bind(policy.policy_number())
        .bind(policy.status().to_string())
        .bind(policy.period().effective_date())
        .bind(policy.period().expiry_date())
        .bind(policy.owner_id().as_uuid())
        .bind(policy.currency().code())
        .bind(policy.version())
        .bind(policy.created_at())
        .bind(policy.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        insert_children(&mut tx, policy).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Fetches a policy with its coverages and endorsements
    pub async fn fetch(&self, policy_id: PolicyId) -> Result<Policy, DatabaseError> {
        let row: Option<PolicyRow> = sqlx::query_as(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE policy_id = $1"
        ))
        .bind(policy_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("Policy", policy_id))?;
        self.hydrate(row).await
    }

    /// Fetches a policy by its human-readable number
    pub async fn fetch_by_number(&self, policy_number: &str) -> Result<Policy, DatabaseError> {
        let row: Option<PolicyRow> = sqlx::query_as(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE policy_number = $1"
        ))
        .bind(policy_number)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("Policy", policy_number))?;
        self.hydrate(row).await
    }

    /// Lists policies, optionally filtered by status and owner
    pub async fn list(
        &self,
        status: Option<PolicyStatus>,
        owner_id: Option<UserId>,
    ) -> Result<Vec<Policy>, DatabaseError> {
        let rows: Vec<PolicyRow> = sqlx::query_as(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::UUID IS NULL OR owner_id = $2) \
             ORDER BY created_at DESC",
        ))
        .bind(status.map(|s| s.to_string()))
        .bind(owner_id.map(|o| *o.as_uuid()))
        .fetch_all(&self.pool)
        .await?;

        let mut policies = Vec::with_capacity(rows.len());
        for row in rows {
            policies.push(self.hydrate(row).await?);
        }
        Ok(policies)
    }

    /// Lists active policies expiring within a date range
    ///
    /// Used by renewal processing to find policies entering their window.
    pub async fn find_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Policy>, DatabaseError> {
        let rows: Vec<PolicyRow> = sqlx::query_as(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies \
             WHERE expiry_date BETWEEN $1 AND $2 AND status = 'active' \
             ORDER BY expiry_date ASC",
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut policies = Vec::with_capacity(rows.len());
        for row in rows {
            policies.push(self.hydrate(row).await?);
        }
        Ok(policies)
    }

    /// Saves a mutated policy, enforcing the version check
    ///
    /// Returns the policy re-read at its new version. Fails with
    /// `StaleVersion` if the row moved since the aggregate was loaded.
    pub async fn update(&self, policy: &Policy) -> Result<Policy, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE policies SET status = $1, effective_date = $2, expiry_date = $3, \
             owner_id = $4, version = version + 1, updated_at = $5 \
             WHERE policy_id = $6 AND version = $7",
        )
        .bind(policy.status().to_string())
        .bind(policy.period().effective_date())
        .bind(policy.period().expiry_date())
        .bind(policy.owner_id().as_uuid())
        .bind(Utc::now())
        .bind(policy.id().as_uuid())
        .bind(policy.version())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM policies WHERE policy_id = $1")
                    .bind(policy.id().as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;
            return match exists {
                Some(_) => Err(DatabaseError::stale("Policy", policy.id())),
                None => Err(DatabaseError::not_found("Policy", policy.id())),
            };
        }

        // Children carry no independent version; replace them wholesale
        // under the already-acquired row version.
        sqlx::query("DELETE FROM coverages WHERE policy_id = $1")
            .bind(policy.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM endorsements WHERE policy_id = $1")
            .bind(policy.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        insert_children(&mut tx, policy).await?;

        tx.commit().await?;
        self.fetch(policy.id()).await
    }

    async fn hydrate(&self, row: PolicyRow) -> Result<Policy, DatabaseError> {
        let coverage_rows: Vec<CoverageRow> = sqlx::query_as(&format!(
            "SELECT {COVERAGE_COLUMNS} FROM coverages WHERE policy_id = $1"
        ))
        .bind(row.policy_id)
        .fetch_all(&self.pool)
        .await?;

        let endorsement_rows: Vec<EndorsementRow> = sqlx::query_as(&format!(
            "SELECT {ENDORSEMENT_COLUMNS} FROM endorsements \
             WHERE policy_id = $1 ORDER BY created_at ASC"
        ))
        .bind(row.policy_id)
        .fetch_all(&self.pool)
        .await?;

        map_policy(row, coverage_rows, endorsement_rows)
    }
}

async fn insert_children(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    policy: &Policy,
) -> Result<(), DatabaseError> {
    for coverage in policy.coverages() {
        sqlx::query(
            "INSERT INTO coverages (coverage_id, policy_id, coverage_type, limit_amount, \
             deductible, premium, status) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(coverage.id.as_uuid())
        .bind(policy.id().as_uuid())
        .bind(coverage.coverage_type.to_string())
        .bind(coverage.limit.amount())
        .bind(coverage.deductible.amount())
        .bind(coverage.premium.amount())
        .bind(coverage.status.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
    }

    for endorsement in policy.endorsements() {
        sqlx::query(
            "INSERT INTO endorsements (endorsement_id, policy_id, endorsement_number, \
             description, premium_adjustment, effective_date, expiry_date, status, \
             requested_by, reviewed_by, review_note, created_at, processed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(endorsement.id.as_uuid())
        .bind(policy.id().as_uuid())
        .bind(&endorsement.endorsement_number)
        .bind(&endorsement.description)
        .bind(endorsement.premium_adjustment.amount())
        .bind(endorsement.period.effective_date())
        .bind(endorsement.period.expiry_date())
        .bind(endorsement.status.to_string())
        .bind(&endorsement.requested_by)
        .bind(&endorsement.reviewed_by)
        .bind(&endorsement.review_note)
        .bind(endorsement.created_at)
        .bind(endorsement.processed_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
    }

    Ok(())
}

fn map_policy(
    row: PolicyRow,
    coverage_rows: Vec<CoverageRow>,
    endorsement_rows: Vec<EndorsementRow>,
) -> Result<Policy, DatabaseError> {
    let status: PolicyStatus = row
        .status
        .parse()
        .map_err(|_| DatabaseError::bad_value("policies.status", &row.status))?;
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|_| DatabaseError::bad_value("policies.currency", &row.currency))?;
    let period = PolicyPeriod::new(row.effective_date, row.expiry_date)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    let coverages = coverage_rows
        .into_iter()
        .map(|c| map_coverage(c, currency))
        .collect::<Result<Vec<_>, _>>()?;
    let endorsements = endorsement_rows
        .into_iter()
        .map(|e| map_endorsement(e, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Policy::restore(
        PolicyId::from(row.policy_id),
        row.policy_number,
        status,
        period,
        UserId::from(row.owner_id),
        currency,
        coverages,
        endorsements,
        row.version,
        row.created_at,
        row.updated_at,
    ))
}

fn map_coverage(row: CoverageRow, currency: Currency) -> Result<Coverage, DatabaseError> {
    let coverage_type: CoverageType = row
        .coverage_type
        .parse()
        .map_err(|_| DatabaseError::bad_value("coverages.coverage_type", &row.coverage_type))?;
    let status: CoverageStatus = row
        .status
        .parse()
        .map_err(|_| DatabaseError::bad_value("coverages.status", &row.status))?;

    Ok(Coverage {
        id: CoverageId::from(row.coverage_id),
        coverage_type,
        limit: Money::new(row.limit_amount, currency),
        deductible: Money::new(row.deductible, currency),
        premium: Money::new(row.premium, currency),
        status,
    })
}

fn map_endorsement(row: EndorsementRow, currency: Currency) -> Result<Endorsement, DatabaseError> {
    let status: EndorsementStatus = row
        .status
        .parse()
        .map_err(|_| DatabaseError::bad_value("endorsements.status", &row.status))?;
    let period = PolicyPeriod::new(row.effective_date, row.expiry_date)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    Ok(Endorsement {
        id: EndorsementId::from(row.endorsement_id),
        endorsement_number: row.endorsement_number,
        description: row.description,
        premium_adjustment: Money::new(row.premium_adjustment, currency),
        period,
        status,
        requested_by: row.requested_by,
        reviewed_by: row.reviewed_by,
        review_note: row.review_note,
        created_at: row.created_at,
        processed_at: row.processed_at,
    })
}
