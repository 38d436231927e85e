//! User entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::UserId;
use crate::error::AccessError;
use crate::permission::{can_access, AccessLevel, ResourceType};
use crate::role::Role;

/// A user of the system
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: UserId,
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    pub active: bool,
    pub roles: Vec<Role>,
    /// Version for optimistic concurrency; bumped by the repository on save
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user with no roles
    ///
    /// # Errors
    ///
    /// Returns a validation error if the username, email, or full name is
    /// malformed.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Result<Self, AccessError> {
        let now = Utc::now();
        let user = Self {
            id: UserId::new_v7(),
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            active: true,
            roles: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    /// Assigns a role; duplicate assignments are rejected
    pub fn assign_role(&mut self, role: Role) -> Result<(), AccessError> {
        if self.roles.iter().any(|r| r.name == role.name) {
            return Err(AccessError::RoleAlreadyAssigned(role.name));
        }
        self.roles.push(role);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a role by name; returns whether anything was removed
    pub fn revoke_role(&mut self, name: &str) -> bool {
        let before = self.roles.len();
        self.roles.retain(|r| !r.name.eq_ignore_ascii_case(name));
        if self.roles.len() != before {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Whether the user holds a role by name
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Capability check over this user's roles
    ///
    /// Inactive users hold no capabilities regardless of their roles.
    pub fn can_access(&self, resource: ResourceType, required: AccessLevel) -> bool {
        self.active && can_access(&self.roles, resource, required)
    }

    /// Deactivates the user
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new("adjuster.lane", "lane@umbrella.example", "Morgan Lane").unwrap()
    }

    #[test]
    fn test_user_creation() {
        let user = test_user();
        assert!(user.active);
        assert!(user.roles.is_empty());
        assert_eq!(user.version, 1);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = User::new("adjuster.lane", "not-an-email", "Morgan Lane");
        assert!(matches!(result, Err(AccessError::Validation(_))));
    }

    #[test]
    fn test_short_username_rejected() {
        let result = User::new("ml", "lane@umbrella.example", "Morgan Lane");
        assert!(matches!(result, Err(AccessError::Validation(_))));
    }

    #[test]
    fn test_role_assignment() {
        let mut user = test_user();
        user.assign_role(Role::builtin("ADJUSTER").unwrap().clone())
            .unwrap();

        assert!(user.has_role("adjuster"));
        assert!(user.can_access(ResourceType::Claim, AccessLevel::Write));
        assert!(!user.can_access(ResourceType::User, AccessLevel::Read));

        let result = user.assign_role(Role::builtin("ADJUSTER").unwrap().clone());
        assert!(matches!(result, Err(AccessError::RoleAlreadyAssigned(_))));
    }

    #[test]
    fn test_deactivated_user_loses_capabilities() {
        let mut user = test_user();
        user.assign_role(Role::builtin("ADMIN").unwrap().clone())
            .unwrap();
        assert!(user.can_access(ResourceType::User, AccessLevel::Admin));

        user.deactivate();
        assert!(!user.can_access(ResourceType::Policy, AccessLevel::Read));
    }

    #[test]
    fn test_revoke_role() {
        let mut user = test_user();
        user.assign_role(Role::builtin("VIEWER").unwrap().clone())
            .unwrap();

        assert!(user.revoke_role("viewer"));
        assert!(!user.revoke_role("viewer"));
        assert!(!user.can_access(ResourceType::Policy, AccessLevel::Read));
    }
}
