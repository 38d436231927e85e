//! User repository
//!
//! Persists users and their role assignments. Role and permission rows are
//! seeded by the initial migration; this repository only links users to
//! them and hydrates the full role/permission sets for capability checks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{RoleId, UserId};
use domain_access::{AccessLevel, Permission, ResourceType, Role, User};

use crate::error::DatabaseError;

/// Repository for users, roles, and assignments
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    full_name: String,
    active: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct RoleLinkRow {
    role_id: Uuid,
    name: String,
    resource: Option<String>,
    access_level: Option<String>,
}

const USER_COLUMNS: &str =
    "user_id, username, email, full_name, active, version, created_at, updated_at";

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user with their role links
    pub async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (user_id, username, email, full_name, active, version, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.active)
        .bind(user.version)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        link_roles(&mut tx, user).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Fetches a user with their roles and permissions
    pub async fn fetch(&self, user_id: UserId) -> Result<User, DatabaseError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("User", user_id))?;
        self.hydrate(row).await
    }

    /// Fetches a user by username
    pub async fn fetch_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("User", username))?;
        self.hydrate(row).await
    }

    /// Lists all users with their roles
    pub async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.hydrate(row).await?);
        }
        Ok(users)
    }

    /// Saves a mutated user, enforcing the version check
    ///
    /// Role links are replaced to match the aggregate. On success the
    /// aggregate's version is advanced to match the row.
    pub async fn update(&self, user: &mut User) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET email = $1, full_name = $2, active = $3, \
             version = version + 1, updated_at = $4 WHERE user_id = $5 AND version = $6",
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.active)
        .bind(Utc::now())
        .bind(user.id.as_uuid())
        .bind(user.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM users WHERE user_id = $1")
                    .bind(user.id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;
            return match exists {
                Some(_) => Err(DatabaseError::stale("User", user.id)),
                None => Err(DatabaseError::not_found("User", user.id)),
            };
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        link_roles(&mut tx, user).await?;

        tx.commit().await?;
        user.version += 1;
        Ok(())
    }

    async fn hydrate(&self, row: UserRow) -> Result<User, DatabaseError> {
        let links: Vec<RoleLinkRow> = sqlx::query_as(
            "SELECT r.role_id, r.name, rp.resource, rp.access_level \
             FROM user_roles ur \
             JOIN roles r ON r.role_id = ur.role_id \
             LEFT JOIN role_permissions rp ON rp.role_id = r.role_id \
             WHERE ur.user_id = $1 \
             ORDER BY r.name",
        )
        .bind(row.user_id)
        .fetch_all(&self.pool)
        .await?;

        let roles = group_roles(links)?;

        Ok(User {
            id: UserId::from(row.user_id),
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            active: row.active,
            roles,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn link_roles(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &User,
) -> Result<(), DatabaseError> {
    for role in &user.roles {
        // Link by name so callers can assign built-in roles without knowing
        // the seeded ids.
        let role_id: Option<(Uuid,)> = sqlx::query_as("SELECT role_id FROM roles WHERE name = $1")
            .bind(&role.name)
            .fetch_optional(&mut **tx)
            .await?;
        let (role_id,) = role_id
            .ok_or_else(|| DatabaseError::not_found("Role", &role.name))?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user.id.as_uuid())
            .bind(role_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| DatabaseError::from(&e))?;
    }
    Ok(())
}

fn group_roles(links: Vec<RoleLinkRow>) -> Result<Vec<Role>, DatabaseError> {
    let mut roles: Vec<Role> = Vec::new();

    for link in links {
        let permission = match (&link.resource, &link.access_level) {
            (Some(resource), Some(level)) => {
                let resource: ResourceType = resource
                    .parse()
                    .map_err(|_| DatabaseError::bad_value("role_permissions.resource", resource))?;
                let level: AccessLevel = level.parse().map_err(|_| {
                    DatabaseError::bad_value("role_permissions.access_level", level)
                })?;
                Some(Permission::new(resource, level))
            }
            _ => None,
        };

        match roles.iter_mut().find(|r| r.name == link.name) {
            Some(role) => {
                if let Some(permission) = permission {
                    role.permissions.push(permission);
                }
            }
            None => {
                let mut role = Role {
                    id: RoleId::from(link.role_id),
                    name: link.name,
                    permissions: Vec::new(),
                };
                if let Some(permission) = permission {
                    role.permissions.push(permission);
                }
                roles.push(role);
            }
        }
    }

    Ok(roles)
}
