//! Route guarding
//!
//! Decides, for one navigation target, whether to render protected content,
//! redirect, or hold in a pending state while auth or roles load.
//!
//! # Evaluation order
//!
//! ```text
//! auth loading ──────────────→ Pending (Hidden inside debounce, else Verifying)
//! signed out + route needs auth → Redirect(login, return_to = location)
//! roles loading ─────────────→ Pending (same debounce rule)
//! capability missing ────────→ Redirect(not found)
//! otherwise ─────────────────→ Render
//! ```
//!
//! Missing capability redirects to the same not-found page as an unknown
//! route, so visitors cannot probe for guarded sections.

pub mod decision;
pub mod routes;

pub use decision::{Decision, Navigator, PendingIndicator, RedirectTarget};
pub use routes::{Requirement, RouteRule, RouteTable};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::permission::PermissionTable;
use crate::roles::RoleState;

/// Signal from the auth collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl AuthState {
    /// Session still being restored
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_authenticated: false,
        }
    }

    pub fn signed_in() -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Window in which pending renders nothing at all
    pub debounce: Duration,
    /// Sign-in page
    pub login_path: String,
    /// Page shown for unknown and denied routes
    pub not_found_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            login_path: "/auth".to_string(),
            not_found_path: "/404".to_string(),
        }
    }
}

/// When and where a guard was mounted
#[derive(Debug, Clone)]
pub struct GuardActivation {
    location: String,
    activated_at: Instant,
}

impl GuardActivation {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            activated_at: Instant::now(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn elapsed(&self) -> Duration {
        self.activated_at.elapsed()
    }
}

/// Route guard
///
/// Holds no per-navigation state; every call recomputes the decision from
/// its inputs.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    config: GuardConfig,
    table: PermissionTable,
}

impl AccessGuard {
    pub fn new(table: PermissionTable) -> Self {
        Self::with_config(table, GuardConfig::default())
    }

    pub fn with_config(table: PermissionTable, config: GuardConfig) -> Self {
        Self { config, table }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decide for one navigation
    ///
    /// `elapsed` is the time since the guard was mounted and `location` the
    /// path being visited, preserved on login redirects.
    pub fn decide(
        &self,
        auth: &AuthState,
        roles: &RoleState,
        requirement: &Requirement,
        elapsed: Duration,
        location: &str,
    ) -> Decision {
        if auth.is_loading {
            return self.pending(elapsed);
        }

        if !auth.is_authenticated && requirement.requires_auth() {
            debug!("Redirecting anonymous visitor from {} to sign in", location);
            return Decision::Redirect {
                target: RedirectTarget::Login,
                path: self.config.login_path.clone(),
                return_to: Some(location.to_string()),
            };
        }

        if roles.is_loading {
            return self.pending(elapsed);
        }

        if !requirement.is_satisfied_by(roles, &self.table) {
            debug!(
                "Role {} lacks {} for {}, answering not found",
                roles.primary_role, requirement, location
            );
            return self.not_found();
        }

        Decision::Render
    }

    /// Decide for a mounted guard, looking the requirement up in `routes`
    pub fn evaluate(
        &self,
        activation: &GuardActivation,
        auth: &AuthState,
        roles: &RoleState,
        routes: &RouteTable,
    ) -> Decision {
        let requirement = routes.requirement_for(activation.location());
        self.decide(auth, roles, &requirement, activation.elapsed(), activation.location())
    }

    /// Redirect used for unknown routes and for denied access alike
    pub fn not_found(&self) -> Decision {
        Decision::Redirect {
            target: RedirectTarget::NotFound,
            path: self.config.not_found_path.clone(),
            return_to: None,
        }
    }

    fn pending(&self, elapsed: Duration) -> Decision {
        let indicator = if elapsed < self.config.debounce {
            PendingIndicator::Hidden
        } else {
            PendingIndicator::Verifying
        };
        Decision::Pending { indicator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;
    use crate::types::Role;

    fn guard() -> AccessGuard {
        AccessGuard::new(PermissionTable::default())
    }

    const EARLY: Duration = Duration::from_millis(20);
    const LATE: Duration = Duration::from_millis(400);

    #[test]
    fn test_auth_loading_is_debounced() {
        let g = guard();
        let roles = RoleState::anonymous();
        let req = Requirement::authenticated();

        assert_eq!(
            g.decide(&AuthState::loading(), &roles, &req, EARLY, "/profile"),
            Decision::Pending { indicator: PendingIndicator::Hidden }
        );
        assert_eq!(
            g.decide(&AuthState::loading(), &roles, &req, LATE, "/profile"),
            Decision::Pending { indicator: PendingIndicator::Verifying }
        );
    }

    #[test]
    fn test_anonymous_redirects_to_login_with_location() {
        let decision = guard().decide(
            &AuthState::signed_out(),
            &RoleState::anonymous(),
            &Requirement::authenticated(),
            LATE,
            "/my-courses?page=2",
        );

        assert_eq!(
            decision,
            Decision::Redirect {
                target: RedirectTarget::Login,
                path: "/auth".to_string(),
                return_to: Some("/my-courses?page=2".to_string()),
            }
        );
    }

    #[test]
    fn test_anonymous_on_public_route_renders() {
        let decision = guard().decide(
            &AuthState::signed_out(),
            &RoleState::anonymous(),
            &Requirement::Public,
            LATE,
            "/stories",
        );
        assert!(decision.is_render());
    }

    #[test]
    fn test_role_loading_holds_pending() {
        let decision = guard().decide(
            &AuthState::signed_in(),
            &RoleState::loading(),
            &Requirement::editor(),
            EARLY,
            "/editor",
        );
        assert_eq!(decision, Decision::Pending { indicator: PendingIndicator::Hidden });
    }

    #[test]
    fn test_auth_loading_checked_before_login_redirect() {
        let decision = guard().decide(
            &AuthState { is_loading: true, is_authenticated: false },
            &RoleState::anonymous(),
            &Requirement::Permission(Permission::AccessAdmin),
            LATE,
            "/admin",
        );
        assert!(decision.is_pending());
    }

    #[test]
    fn test_missing_capability_answers_not_found() {
        let decision = guard().decide(
            &AuthState::signed_in(),
            &RoleState::from_roles([Role::Premium]),
            &Requirement::editor(),
            LATE,
            "/editor/stories/new",
        );
        assert_eq!(decision.redirect_target(), Some(RedirectTarget::NotFound));
        assert_eq!(decision, guard().not_found());
    }

    #[test]
    fn test_sufficient_role_renders() {
        let g = guard();
        let editor = RoleState::from_roles([Role::Editor]);

        assert!(g
            .decide(&AuthState::signed_in(), &editor, &Requirement::editor(), LATE, "/editor")
            .is_render());
        assert!(g
            .decide(&AuthState::signed_in(), &editor, &Requirement::authenticated(), LATE, "/profile")
            .is_render());
    }

    #[test]
    fn test_custom_paths() {
        let g = AccessGuard::with_config(
            PermissionTable::default(),
            GuardConfig {
                debounce: Duration::ZERO,
                login_path: "/sign-in".to_string(),
                not_found_path: "/missing".to_string(),
            },
        );

        let pending = g.decide(
            &AuthState::loading(),
            &RoleState::anonymous(),
            &Requirement::Public,
            Duration::ZERO,
            "/",
        );
        assert_eq!(pending, Decision::Pending { indicator: PendingIndicator::Verifying });

        match g.not_found() {
            Decision::Redirect { path, .. } => assert_eq!(path, "/missing"),
            other => panic!("unexpected decision: {other:?}"),
        }
    }
}
