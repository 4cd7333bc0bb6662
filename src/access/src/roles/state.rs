//! Derived role state for one identity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::permission::{Permission, PermissionTable};
use crate::types::{Role, RoleAssignment};

/// Snapshot of the roles held by the current identity
///
/// Always replaced whole. While `is_loading` is set, the raw roles are empty
/// and the primary role is `User`, so a half-resolved identity never carries
/// the previous identity's privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    pub raw_roles: BTreeSet<Role>,
    pub primary_role: Role,
    pub is_loading: bool,
}

impl RoleState {
    /// State for an anonymous visitor, or after a failed lookup
    pub fn anonymous() -> Self {
        Self {
            raw_roles: BTreeSet::new(),
            primary_role: Role::User,
            is_loading: false,
        }
    }

    /// Placeholder while a lookup is in flight
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::anonymous()
        }
    }

    /// Resolved state from raw role assignments
    pub fn from_roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        let raw_roles: BTreeSet<Role> = roles.into_iter().collect();
        let primary_role = Role::primary(raw_roles.iter().copied());
        Self {
            raw_roles,
            primary_role,
            is_loading: false,
        }
    }

    pub fn from_assignments(assignments: &[RoleAssignment]) -> Self {
        Self::from_roles(assignments.iter().map(|a| a.role))
    }

    /// Whether the primary role holds `permission`
    pub fn has_permission(&self, table: &PermissionTable, permission: Permission) -> bool {
        table.grants(self.primary_role, permission)
    }

    /// Whether the primary role holds any of `permissions`
    pub fn has_any_permission(&self, table: &PermissionTable, permissions: &[Permission]) -> bool {
        table.grants_any(self.primary_role, permissions)
    }

    pub fn is_admin(&self) -> bool {
        self.primary_role == Role::Admin
    }

    /// Editor or above
    pub fn is_editor(&self) -> bool {
        self.primary_role >= Role::Editor
    }

    /// Premium or above
    pub fn is_premium(&self) -> bool {
        self.primary_role >= Role::Premium
    }
}

impl Default for RoleState {
    fn default() -> Self {
        Self::anonymous()
    }
}
