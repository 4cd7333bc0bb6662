//! Core identity and role types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AccessError;

/// Opaque reference to an authenticated user
///
/// Supplied by the auth collaborator. The access core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an existing user id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Current identity: a user, or `None` for anonymous visitors
pub type Identity = Option<UserId>;

/// Platform role, ordered by privilege
///
/// `User < Premium < Editor < Admin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Signed-in reader with free content only
    #[default]
    User,
    /// Subscriber with premium stories, courses and games
    Premium,
    /// Content editor
    Editor,
    /// Platform administrator
    Admin,
}

impl Role {
    /// All roles, lowest privilege first
    pub const ALL: [Role; 4] = [Role::User, Role::Premium, Role::Editor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Premium => "premium",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    /// Collapse raw assignments into the single highest role
    ///
    /// An empty set yields `User`.
    pub fn primary<I>(roles: I) -> Role
    where
        I: IntoIterator<Item = Role>,
    {
        roles.into_iter().max().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "premium" => Ok(Role::Premium),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

/// One raw role assignment as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub granted_at: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            granted_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::User < Role::Premium);
        assert!(Role::Premium < Role::Editor);
        assert!(Role::Editor < Role::Admin);
    }

    #[test]
    fn test_primary_role_precedence() {
        assert_eq!(Role::primary(vec![]), Role::User);
        assert_eq!(Role::primary(vec![Role::Premium, Role::User]), Role::Premium);
        assert_eq!(Role::primary(vec![Role::Editor, Role::Admin, Role::Premium]), Role::Admin);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Editor".parse::<Role>().unwrap(), Role::Editor);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!("owner".parse::<Role>(), Err(AccessError::UnknownRole(_))));
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&Role::Premium).unwrap();
        assert_eq!(json, "\"premium\"");

        let assignment: RoleAssignment =
            serde_json::from_str(r#"{"user_id":"u-1","role":"editor"}"#).unwrap();
        assert_eq!(assignment.role, Role::Editor);
        assert_eq!(assignment.user_id.as_str(), "u-1");
        assert!(assignment.granted_at.is_none());
    }
}
