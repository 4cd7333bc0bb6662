//! Route requirements and path matching

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AccessError, Result};
use crate::permission::{Permission, PermissionTable};
use crate::roles::RoleState;

/// What a route demands from the visitor
///
/// Parsed from configuration strings. Parsing never fails: a name outside
/// the permission vocabulary becomes `Unrecognized`, which no role holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Requirement {
    /// Anyone, signed in or not
    Public,
    /// Any signed-in user
    Authenticated,
    /// A single permission
    Permission(Permission),
    /// At least one of several permissions
    AnyPermission(Vec<Permission>),
    /// Unknown capability name
    Unrecognized(String),
}

impl Requirement {
    /// Plain protected route
    pub fn authenticated() -> Self {
        Requirement::Authenticated
    }

    /// Editor-or-above route
    pub fn editor() -> Self {
        Requirement::Permission(Permission::EditStories)
    }

    /// Parse a requirement name
    ///
    /// Accepts `public`, `authenticated`, `editor`, `admin`, a permission
    /// name, or `any:<permission>,<permission>,...`.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name {
            "public" => return Requirement::Public,
            "authenticated" => return Requirement::Authenticated,
            "editor" => return Requirement::editor(),
            "admin" => return Requirement::Permission(Permission::AccessAdmin),
            _ => {}
        }

        if let Some(list) = name.strip_prefix("any:") {
            let parsed: std::result::Result<Vec<Permission>, _> = list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::parse)
                .collect();
            return match parsed {
                Ok(permissions) => Requirement::AnyPermission(permissions),
                Err(_) => Requirement::Unrecognized(name.to_string()),
            };
        }

        match name.parse::<Permission>() {
            Ok(permission) => Requirement::Permission(permission),
            Err(_) => Requirement::Unrecognized(name.to_string()),
        }
    }

    /// Whether an anonymous visitor is sent to sign in
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Requirement::Public)
    }

    /// Whether `roles` meets the capability part of this requirement
    pub fn is_satisfied_by(&self, roles: &RoleState, table: &PermissionTable) -> bool {
        match self {
            Requirement::Public | Requirement::Authenticated => true,
            Requirement::Permission(p) => roles.has_permission(table, *p),
            Requirement::AnyPermission(ps) => roles.has_any_permission(table, ps),
            Requirement::Unrecognized(_) => false,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Public => f.write_str("public"),
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::Permission(p) => f.write_str(p.as_str()),
            Requirement::AnyPermission(ps) => {
                let names: Vec<&str> = ps.iter().map(|p| p.as_str()).collect();
                write!(f, "any:{}", names.join(","))
            }
            Requirement::Unrecognized(name) => f.write_str(name),
        }
    }
}

impl From<String> for Requirement {
    fn from(name: String) -> Self {
        Requirement::parse(&name)
    }
}

impl From<Requirement> for String {
    fn from(requirement: Requirement) -> Self {
        requirement.to_string()
    }
}

/// One guarded path prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path: String,
    pub requires: Requirement,
}

/// Path prefix → requirement, longest segment-aligned prefix wins
///
/// Paths with no matching rule are public.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Empty table: every path is public
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured rules
    pub fn from_rules(rules: Vec<RouteRule>) -> Result<Self> {
        rules
            .into_iter()
            .try_fold(Self::new(), |table, rule| table.with_rule(&rule.path, rule.requires))
    }

    /// Add or replace the rule for `path`
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoute` if `path` does not start with `/`.
    pub fn with_rule(mut self, path: &str, requires: Requirement) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(AccessError::InvalidRoute(format!(
                "route path must start with '/': {path}"
            )));
        }

        let path = normalize(path).to_string();
        self.rules.retain(|r| r.path != path);
        self.rules.push(RouteRule { path, requires });
        Ok(self)
    }

    /// Requirement for a navigation target
    pub fn requirement_for(&self, location: &str) -> Requirement {
        let path = normalize(strip_query(location));
        self.rules
            .iter()
            .filter(|rule| prefix_matches(&rule.path, path))
            .max_by_key(|rule| rule.path.len())
            .map(|rule| rule.requires.clone())
            .unwrap_or(Requirement::Public)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The platform's guarded sections
    pub fn platform_default() -> Self {
        let rules = [
            ("/profile", Requirement::Authenticated),
            ("/my-courses", Requirement::Authenticated),
            ("/premium", Requirement::Permission(Permission::ViewPremiumContent)),
            ("/editor", Requirement::editor()),
            ("/admin", Requirement::Permission(Permission::AccessAdmin)),
        ];
        Self {
            rules: rules
                .into_iter()
                .map(|(path, requires)| RouteRule {
                    path: path.to_string(),
                    requires,
                })
                .collect(),
        }
    }
}

fn strip_query(location: &str) -> &str {
    location
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(location)
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
