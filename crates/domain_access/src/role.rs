//! Roles
//!
//! A role is a named bundle of permissions. The four built-in roles are
//! defined here and seeded into the database by the initial migration;
//! token-based authorization resolves role names against this table.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use core_kernel::RoleId;
use crate::permission::{AccessLevel, Permission, ResourceType};

/// A named bundle of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Creates a role with the given permissions
    pub fn new(name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            id: RoleId::new_v7(),
            name: name.into(),
            permissions,
        }
    }

    /// Looks up a built-in role by name (case-insensitive)
    pub fn builtin(name: &str) -> Option<&'static Role> {
        BUILTIN_ROLES
            .iter()
            .find(|role| role.name.eq_ignore_ascii_case(name))
    }
}

static BUILTIN_ROLES: Lazy<Vec<Role>> = Lazy::new(|| {
    use AccessLevel::*;
    use ResourceType::*;

    vec![
        Role::new(
            "ADMIN",
            vec![
                Permission::new(Policy, Admin),
                Permission::new(Claim, Admin),
                Permission::new(Payment, Admin),
                Permission::new(Document, Admin),
                Permission::new(User, Admin),
            ],
        ),
        Role::new(
            "MANAGER",
            vec![
                Permission::new(Policy, Approve),
                Permission::new(Claim, Approve),
                Permission::new(Payment, Write),
                Permission::new(Document, Write),
                Permission::new(User, Read),
            ],
        ),
        Role::new(
            "ADJUSTER",
            vec![
                Permission::new(Policy, Read),
                Permission::new(Claim, Write),
                Permission::new(Payment, Write),
                Permission::new(Document, Write),
            ],
        ),
        Role::new(
            "VIEWER",
            vec![
                Permission::new(Policy, Read),
                Permission::new(Claim, Read),
                Permission::new(Document, Read),
            ],
        ),
    ]
});

/// All built-in roles
pub fn builtin_roles() -> &'static [Role] {
    &BUILTIN_ROLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        assert!(Role::builtin("admin").is_some());
        assert!(Role::builtin("Manager").is_some());
        assert!(Role::builtin("AUDITOR").is_none());
    }

    #[test]
    fn test_builtin_roles_are_distinct() {
        let names: Vec<&str> = builtin_roles().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ADMIN", "MANAGER", "ADJUSTER", "VIEWER"]);
    }

    #[test]
    fn test_adjuster_cannot_touch_users() {
        let adjuster = Role::builtin("ADJUSTER").unwrap();
        assert!(!adjuster
            .permissions
            .iter()
            .any(|p| p.resource == ResourceType::User));
    }
}
