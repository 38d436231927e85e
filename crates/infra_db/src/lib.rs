//! Database infrastructure layer
//!
//! PostgreSQL persistence via SQLx. Repositories translate between domain
//! aggregates and relational rows; every mutable aggregate carries a version
//! column, and updates are guarded with `WHERE version = $n` so a stale save
//! surfaces as [`DatabaseError::StaleVersion`] rather than silently winning.

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::{
    audit::{IntegrationAuditRepository, NewAuditRecord},
    claims::ClaimRepository,
    policy::PolicyRepository,
    users::UserRepository,
};

/// Embedded SQL migrations
///
/// Run at startup with `migrator().run(&pool)`.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
