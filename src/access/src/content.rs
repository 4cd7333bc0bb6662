//! Role-gated content
//!
//! Stories, courses and games carry an access tier and a publication flag.
//! The gate answers from the current [`RoleState`]; a state that is still
//! loading only sees free, published content.

use serde::{Deserialize, Serialize};

use crate::permission::{Permission, PermissionTable};
use crate::roles::RoleState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Story,
    Course,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    #[default]
    Free,
    Premium,
}

/// Catalog entry as far as gating is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    #[serde(default)]
    pub tier: AccessTier,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl ContentItem {
    pub fn new(id: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            tier: AccessTier::Free,
            published: true,
        }
    }

    pub fn premium(mut self) -> Self {
        self.tier = AccessTier::Premium;
        self
    }

    pub fn draft(mut self) -> Self {
        self.published = false;
        self
    }

    /// Permissions needed to open this item
    pub fn required_permissions(&self) -> Vec<Permission> {
        let mut required = vec![match self.kind {
            ContentKind::Story => Permission::ViewContent,
            ContentKind::Course => Permission::EnrollCourses,
            ContentKind::Game => Permission::PlayGames,
        }];
        if self.tier == AccessTier::Premium {
            required.push(Permission::ViewPremiumContent);
        }
        if !self.published {
            required.push(Permission::ViewDrafts);
        }
        required
    }
}

/// Decides which catalog items a role state may open
#[derive(Debug, Clone, Default)]
pub struct ContentGate {
    table: PermissionTable,
}

impl ContentGate {
    pub fn new(table: PermissionTable) -> Self {
        Self { table }
    }

    pub fn can_view(&self, roles: &RoleState, item: &ContentItem) -> bool {
        if roles.is_loading && (item.tier == AccessTier::Premium || !item.published) {
            return false;
        }
        item.required_permissions()
            .into_iter()
            .all(|p| roles.has_permission(&self.table, p))
    }

    /// Items from `items` that `roles` may open, order preserved
    pub fn visible<'a>(&self, roles: &RoleState, items: &'a [ContentItem]) -> Vec<&'a ContentItem> {
        items.iter().filter(|item| self.can_view(roles, item)).collect()
    }
}
