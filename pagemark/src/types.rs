//! Common type definitions and the role/requirement vocabulary used by
//! the access control gate.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: user account identifier
//! - [`CampaignId`]: reading campaign identifier
//! - [`TicketId`]: support ticket identifier
//!
//! Access control is built on two types:
//!
//! - [`Role`]: the role assigned to a user account (exactly one per user)
//! - [`Requirement`]: what a route declaration demands of the caller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type CampaignId = Uuid;
pub type FaqId = Uuid;
pub type TierId = Uuid;
pub type SponsorId = Uuid;
pub type TicketId = Uuid;
pub type SocialAccountId = Uuid;
pub type SubscriptionId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// User roles, ordered by privilege. Stored as text in the database and
/// converted through [`FromStr`] so that unknown role strings are
/// rejected instead of silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Member => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }

    /// Whether this role satisfies a declared role requirement.
    /// Higher-privilege roles satisfy lower-privilege requirements.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Access requirement attached to a route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may pass, including anonymous callers
    Public,
    /// Any valid session suffices
    Authenticated,
    /// Session must carry a role satisfying the given role
    Role(Role),
    /// Session must carry a role satisfying at least one of the given roles
    AnyRole(Vec<Role>),
}

impl Requirement {
    /// Parse a requirement from its configuration spelling: "public",
    /// "authenticated", a role name, or a `|`-separated list of role names.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "public" => Ok(Requirement::Public),
            "authenticated" => Ok(Requirement::Authenticated),
            other if other.contains('|') => {
                let roles = other.split('|').map(str::trim).map(Role::from_str).collect::<Result<Vec<_>, _>>()?;
                if roles.is_empty() {
                    return Err("empty role list".to_string());
                }
                Ok(Requirement::AnyRole(roles))
            }
            other => Role::from_str(other).map(Requirement::Role),
        }
    }

    /// Whether a caller with the given role (or no session at all)
    /// satisfies this requirement.
    pub fn satisfied_by(&self, role: Option<Role>) -> bool {
        match (self, role) {
            (Requirement::Public, _) => true,
            (_, None) => false,
            (Requirement::Authenticated, Some(_)) => true,
            (Requirement::Role(required), Some(role)) => role.satisfies(*required),
            (Requirement::AnyRole(required), Some(role)) => required.iter().any(|r| role.satisfies(*r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_is_transitive() {
        assert!(Role::Admin.satisfies(Role::Member));
        assert!(Role::Admin.satisfies(Role::Staff));
        assert!(Role::Staff.satisfies(Role::Member));
        assert!(!Role::Member.satisfies(Role::Staff));
        assert!(!Role::Staff.satisfies(Role::Admin));
    }

    #[test]
    fn unknown_role_strings_are_rejected() {
        assert!(Role::from_str("superuser").is_err());
        assert!(Requirement::parse("root").is_err());
    }

    #[test]
    fn requirement_parsing() {
        assert_eq!(Requirement::parse("public").unwrap(), Requirement::Public);
        assert_eq!(Requirement::parse("authenticated").unwrap(), Requirement::Authenticated);
        assert_eq!(Requirement::parse("admin").unwrap(), Requirement::Role(Role::Admin));
        assert_eq!(
            Requirement::parse("staff|admin").unwrap(),
            Requirement::AnyRole(vec![Role::Staff, Role::Admin])
        );
        assert!(Requirement::parse("staff|root").is_err());
    }

    #[test]
    fn requirement_satisfaction() {
        assert!(Requirement::Public.satisfied_by(None));
        assert!(!Requirement::Authenticated.satisfied_by(None));
        assert!(Requirement::Authenticated.satisfied_by(Some(Role::Member)));
        assert!(!Requirement::Role(Role::Staff).satisfied_by(Some(Role::Member)));
        assert!(Requirement::Role(Role::Staff).satisfied_by(Some(Role::Admin)));
        assert!(Requirement::AnyRole(vec![Role::Staff]).satisfied_by(Some(Role::Admin)));
        assert!(!Requirement::AnyRole(vec![Role::Staff, Role::Admin]).satisfied_by(Some(Role::Member)));
    }
}
