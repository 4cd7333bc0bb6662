//! # Storynest Access
//!
//! Role resolution and route guarding for the Storynest client.
//!
//! ## Features
//!
//! - **Closed vocabulary**: `Role` and `Permission` are enums; the permission
//!   table is checked to be monotonic over `user < premium < editor < admin`
//! - **Fail-closed resolution**: lookup errors resolve to the `user` role
//! - **Last identity wins**: stale role lookups never overwrite newer state
//! - **Uniform denial**: a missing capability redirects to the not-found page
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storynest_access::{
//!     AccessGuard, AuthState, InMemoryRoleLookup, PermissionTable, Requirement, Role,
//!     RoleResolver, UserId,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let lookup = Arc::new(InMemoryRoleLookup::new());
//!     let ada = UserId::new("ada");
//!     lookup.grant(&ada, Role::Premium);
//!
//!     let resolver = RoleResolver::new(lookup);
//!     let roles = resolver.resolve(Some(ada)).await;
//!
//!     let guard = AccessGuard::new(PermissionTable::default());
//!     let decision = guard.decide(
//!         &AuthState::signed_in(),
//!         &roles,
//!         &Requirement::editor(),
//!         Duration::from_millis(250),
//!         "/editor",
//!     );
//!
//!     assert!(!decision.is_render());
//! }
//! ```

pub mod content;
pub mod error;
pub mod guard;
pub mod permission;
pub mod roles;
pub mod types;

// Re-export commonly used types
pub use content::{AccessTier, ContentGate, ContentItem, ContentKind};
pub use error::{AccessError, Result};
pub use guard::{
    AccessGuard, AuthState, Decision, GuardActivation, GuardConfig, Navigator, PendingIndicator,
    RedirectTarget, Requirement, RouteRule, RouteTable,
};
pub use permission::{Permission, PermissionSet, PermissionTable};
pub use roles::{InMemoryRoleLookup, ResolverConfig, RoleLookup, RoleResolver, RoleState};
pub use types::{Identity, Role, RoleAssignment, UserId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
