//! Permissions and the capability predicate
//!
//! A permission is a (resource type, access level) pair. Levels are totally
//! ordered; holding Write on a resource implies Read, holding Admin implies
//! everything below it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Kinds of protected resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Policy,
    Claim,
    Payment,
    Document,
    User,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Policy => write!(f, "policy"),
            ResourceType::Claim => write!(f, "claim"),
            ResourceType::Payment => write!(f, "payment"),
            ResourceType::Document => write!(f, "document"),
            ResourceType::User => write!(f, "user"),
        }
    }
}

/// Access levels, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Read,
    Write,
    Approve,
    Admin,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Read => write!(f, "read"),
            AccessLevel::Write => write!(f, "write"),
            AccessLevel::Approve => write!(f, "approve"),
            AccessLevel::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy" => Ok(ResourceType::Policy),
            "claim" => Ok(ResourceType::Claim),
            "payment" => Ok(ResourceType::Payment),
            "document" => Ok(ResourceType::Document),
            "user" => Ok(ResourceType::User),
            other => Err(format!("unknown resource type '{}'", other)),
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(AccessLevel::Read),
            "write" => Ok(AccessLevel::Write),
            "approve" => Ok(AccessLevel::Approve),
            "admin" => Ok(AccessLevel::Admin),
            other => Err(format!("unknown access level '{}'", other)),
        }
    }
}

/// A (resource type, access level) capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: ResourceType,
    pub level: AccessLevel,
}

impl Permission {
    pub fn new(resource: ResourceType, level: AccessLevel) -> Self {
        Self { resource, level }
    }

    /// Whether this permission satisfies a request for `resource` at `level`
    pub fn grants(&self, resource: ResourceType, level: AccessLevel) -> bool {
        self.resource == resource && self.level >= level
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.level)
    }
}

/// The capability predicate
///
/// A caller may act iff any of their roles holds a permission for the
/// resource type at or above the required level. Pure and stateless.
pub fn can_access(roles: &[Role], resource: ResourceType, required: AccessLevel) -> bool {
    roles
        .iter()
        .flat_map(|role| role.permissions.iter())
        .any(|permission| permission.grants(resource, required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::builtin_roles;

    #[test]
    fn test_level_ordering() {
        assert!(AccessLevel::Read < AccessLevel::Write);
        assert!(AccessLevel::Write < AccessLevel::Approve);
        assert!(AccessLevel::Approve < AccessLevel::Admin);
    }

    #[test]
    fn test_higher_level_grants_lower() {
        let permission = Permission::new(ResourceType::Policy, AccessLevel::Approve);
        assert!(permission.grants(ResourceType::Policy, AccessLevel::Read));
        assert!(permission.grants(ResourceType::Policy, AccessLevel::Write));
        assert!(permission.grants(ResourceType::Policy, AccessLevel::Approve));
        assert!(!permission.grants(ResourceType::Policy, AccessLevel::Admin));
    }

    #[test]
    fn test_permission_is_resource_scoped() {
        let permission = Permission::new(ResourceType::Claim, AccessLevel::Admin);
        assert!(!permission.grants(ResourceType::Policy, AccessLevel::Read));
    }

    #[test]
    fn test_predicate_over_multiple_roles() {
        let roles = builtin_roles();
        let viewer: Vec<Role> = roles
            .iter()
            .filter(|r| r.name == "VIEWER")
            .cloned()
            .collect();
        let manager: Vec<Role> = roles
            .iter()
            .filter(|r| r.name == "MANAGER")
            .cloned()
            .collect();

        assert!(can_access(&viewer, ResourceType::Policy, AccessLevel::Read));
        assert!(!can_access(&viewer, ResourceType::Policy, AccessLevel::Write));

        assert!(can_access(&manager, ResourceType::Policy, AccessLevel::Write));
        assert!(can_access(&manager, ResourceType::Claim, AccessLevel::Approve));
        assert!(!can_access(&manager, ResourceType::User, AccessLevel::Admin));
    }

    #[test]
    fn test_empty_roles_grant_nothing() {
        assert!(!can_access(&[], ResourceType::Claim, AccessLevel::Read));
    }
}
