//! Permission vocabulary and the role lattice
//!
//! Every permission held by a role is also held by every higher role. The
//! table stores one permission set per role and refuses to be built from
//! rows that break this ordering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AccessError, Result};
use crate::types::Role;

/// Capability checked against the current role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read free stories and watch free lessons
    ViewContent,
    /// Play the games section
    PlayGames,
    /// Enroll in courses and track progress
    EnrollCourses,
    /// Open premium stories, courses and games
    ViewPremiumContent,
    /// Download stories for offline reading
    DownloadContent,
    /// Create and edit stories
    EditStories,
    /// Create and edit courses and lessons
    ManageCourses,
    /// Upload audio, images and video to storage
    UploadMedia,
    /// See unpublished drafts
    ViewDrafts,
    /// Enter the admin dashboard
    AccessAdmin,
    /// Assign and revoke roles
    ManageUsers,
    /// View platform analytics
    ViewAnalytics,
}

impl Permission {
    pub const COUNT: usize = 12;

    pub const ALL: [Permission; Permission::COUNT] = [
        Permission::ViewContent,
        Permission::PlayGames,
        Permission::EnrollCourses,
        Permission::ViewPremiumContent,
        Permission::DownloadContent,
        Permission::EditStories,
        Permission::ManageCourses,
        Permission::UploadMedia,
        Permission::ViewDrafts,
        Permission::AccessAdmin,
        Permission::ManageUsers,
        Permission::ViewAnalytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewContent => "view_content",
            Permission::PlayGames => "play_games",
            Permission::EnrollCourses => "enroll_courses",
            Permission::ViewPremiumContent => "view_premium_content",
            Permission::DownloadContent => "download_content",
            Permission::EditStories => "edit_stories",
            Permission::ManageCourses => "manage_courses",
            Permission::UploadMedia => "upload_media",
            Permission::ViewDrafts => "view_drafts",
            Permission::AccessAdmin => "access_admin",
            Permission::ManageUsers => "manage_users",
            Permission::ViewAnalytics => "view_analytics",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Lowest role holding this permission in the built-in table
    pub const fn default_minimum(self) -> Role {
        match self {
            Permission::ViewContent | Permission::PlayGames | Permission::EnrollCourses => Role::User,
            Permission::ViewPremiumContent | Permission::DownloadContent => Role::Premium,
            Permission::EditStories
            | Permission::ManageCourses
            | Permission::UploadMedia
            | Permission::ViewDrafts => Role::Editor,
            Permission::AccessAdmin | Permission::ManageUsers | Permission::ViewAnalytics => {
                Role::Admin
            }
        }
    }
}

// The admin area must never be reachable below admin in the built-in table.
const _: () = assert!(matches!(Permission::AccessAdmin.default_minimum(), Role::Admin));
const _: () = assert!(matches!(Permission::ManageUsers.default_minimum(), Role::Admin));
const _: () = assert!(Permission::COUNT <= u16::BITS as usize);

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AccessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| AccessError::UnknownPermission(name.to_string()))
    }
}

/// Compact set of permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionSet(u16);

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub fn insert(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    pub fn remove(&mut self, permission: Permission) {
        self.0 &= !permission.bit();
    }

    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = PermissionSet::empty();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

/// Fixed mapping from role to granted permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    /// Indexed by `Role as usize`
    grants: [PermissionSet; 4],
}

impl PermissionTable {
    /// Build a table from explicit per-role grants
    ///
    /// Roles missing from `grants` hold nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPermissionTable` if a lower role holds a permission
    /// that a higher role does not.
    pub fn from_grants(grants: &BTreeMap<Role, Vec<Permission>>) -> Result<Self> {
        let mut rows = [PermissionSet::empty(); 4];
        for (role, permissions) in grants {
            rows[*role as usize] = permissions.iter().copied().collect();
        }

        let table = Self { grants: rows };
        table.validate()?;
        Ok(table)
    }

    /// Move the lowest role holding `permission` to `minimum`
    ///
    /// Rewrites every row, so the result stays monotonic.
    pub fn with_minimum(mut self, permission: Permission, minimum: Role) -> Self {
        for role in Role::ALL {
            let row = &mut self.grants[role as usize];
            if role >= minimum {
                row.insert(permission);
            } else {
                row.remove(permission);
            }
        }
        self
    }

    /// Whether `role` holds `permission`
    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.grants[role as usize].contains(permission)
    }

    /// Whether `role` holds at least one of `permissions`
    pub fn grants_any(&self, role: Role, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.grants(role, *p))
    }

    /// All permissions held by `role`
    pub fn granted(&self, role: Role) -> PermissionSet {
        self.grants[role as usize]
    }

    /// Lowest role holding `permission`, if any role does
    pub fn minimum_role(&self, permission: Permission) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.grants(*r, permission))
    }

    /// Check the lattice: each row must be a subset of the next one up
    pub fn validate(&self) -> Result<()> {
        for pair in Role::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let lower_row = self.granted(lower);
            let higher_row = self.granted(higher);
            if !lower_row.is_subset(&higher_row) {
                let missing: Vec<&str> = lower_row
                    .iter()
                    .filter(|p| !higher_row.contains(*p))
                    .map(|p| p.as_str())
                    .collect();
                return Err(AccessError::InvalidPermissionTable(format!(
                    "{} holds [{}] but {} does not",
                    lower,
                    missing.join(", "),
                    higher
                )));
            }
        }
        Ok(())
    }

    /// Role → sorted permission names, for display
    pub fn to_matrix(&self) -> BTreeMap<Role, Vec<Permission>> {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.granted(role).iter().collect()))
            .collect()
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        let mut grants = [PermissionSet::empty(); 4];
        for permission in Permission::ALL {
            let minimum = permission.default_minimum();
            for role in Role::ALL.into_iter().filter(|r| *r >= minimum) {
                grants[role as usize].insert(permission);
            }
        }
        Self { grants }
    }
}
