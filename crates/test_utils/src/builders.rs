//! Test data builders
//!
//! Builders produce real domain aggregates with sensible defaults so tests
//! specify only the fields they care about. Person-shaped values come from
//! `fake` so fixtures do not all share one name.

use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PolicyId, PolicyPeriod, UserId};
use domain_access::{Role, User};
use domain_claims::Claim;
use domain_policy::{Coverage, CoverageType, Policy, PolicyBuilder};

use crate::fixtures::PeriodFixtures;

/// Builder for test policies
pub struct TestPolicyBuilder {
    period: PolicyPeriod,
    owner_id: UserId,
    currency: Currency,
    coverage_premiums: Vec<Decimal>,
    activate: bool,
}

impl Default for TestPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPolicyBuilder {
    /// A draft policy over calendar 2025 with one liability coverage
    pub fn new() -> Self {
        Self {
            period: PeriodFixtures::calendar_2025(),
            owner_id: UserId::new(),
            currency: Currency::USD,
            coverage_premiums: vec![dec!(425.00)],
            activate: false,
        }
    }

    /// Sets the policy period
    pub fn with_period(mut self, period: PolicyPeriod) -> Self {
        self.period = period;
        self
    }

    /// Sets the owner
    pub fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Replaces the coverage set with one coverage per premium given
    pub fn with_coverage_premiums(mut self, premiums: Vec<Decimal>) -> Self {
        self.coverage_premiums = premiums;
        self
    }

    /// Activates the policy after building
    pub fn active(mut self) -> Self {
        self.activate = true;
        self
    }

    /// Builds the policy
    pub fn build(self) -> Policy {
        let mut builder = PolicyBuilder::new()
            .owner(self.owner_id)
            .period(self.period)
            .currency(self.currency);

        for premium in &self.coverage_premiums {
            let coverage = Coverage::new(
                CoverageType::PersonalLiability,
                Money::new(dec!(1_000_000), self.currency),
                Money::zero(self.currency),
                Money::new(*premium, self.currency),
            )
            .expect("valid test coverage");
            builder = builder.add_coverage(coverage);
        }

        let mut policy = builder.build().expect("valid test policy");
        if self.activate {
            policy.activate().expect("activate test policy");
        }
        policy
    }
}

/// Builder for test claims
pub struct TestClaimBuilder {
    policy_id: PolicyId,
    claim_amount: Decimal,
    currency: Currency,
    description: Option<String>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// A pending claim for 1000 USD, incident two weeks ago
    pub fn new() -> Self {
        Self {
            policy_id: PolicyId::new(),
            claim_amount: dec!(1000.00),
            currency: Currency::USD,
            description: Some("test loss".to_string()),
        }
    }

    /// Sets the policy the claim is made under
    pub fn with_policy_id(mut self, policy_id: PolicyId) -> Self {
        self.policy_id = policy_id;
        self
    }

    /// Sets the claimed amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.claim_amount = amount;
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        let today = Utc::now().date_naive();
        Claim::open(
            self.policy_id,
            today - Duration::days(14),
            today - Duration::days(7),
            Money::new(self.claim_amount, self.currency),
            self.description,
        )
        .expect("valid test claim")
    }
}

/// Builder for test users
pub struct TestUserBuilder {
    username: String,
    roles: Vec<&'static str>,
}

impl Default for TestUserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestUserBuilder {
    /// An active user with no roles and a generated identity
    pub fn new() -> Self {
        Self {
            username: "test.user".to_string(),
            roles: Vec::new(),
        }
    }

    /// Sets the username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Assigns built-in roles by name
    pub fn with_roles(mut self, roles: Vec<&'static str>) -> Self {
        self.roles = roles;
        self
    }

    /// Builds the user
    pub fn build(self) -> User {
        let full_name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let mut user = User::new(self.username, email, full_name).expect("valid test user");
        for name in self.roles {
            let role = Role::builtin(name).expect("known built-in role");
            user.assign_role(role.clone()).expect("assign role");
        }
        user
    }
}
