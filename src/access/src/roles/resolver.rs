//! Role resolver for the current identity
//!
//! Turns an identity into a [`RoleState`] by asking the [`RoleLookup`]
//! collaborator, and answers permission checks against the result.
//!
//! - **Last identity wins**: every resolution is tagged with a generation
//!   number; a completion whose generation is no longer current is dropped.
//! - **Fail-closed**: a failed lookup resolves to the anonymous state.
//! - **Per-identity cache**: repeated resolutions of the same identity reuse
//!   the committed state until the TTL elapses. Fail-closed fallbacks are
//!   not cached, so the next resolution retries the lookup.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storynest_access::{InMemoryRoleLookup, Permission, Role, RoleResolver, UserId};
//!
//! # async fn example() {
//! let lookup = Arc::new(InMemoryRoleLookup::new());
//! let alice = UserId::new("alice");
//! lookup.grant(&alice, Role::Editor);
//!
//! let resolver = RoleResolver::new(lookup);
//! let state = resolver.resolve(Some(alice)).await;
//!
//! assert_eq!(state.primary_role, Role::Editor);
//! assert!(resolver.check_permission(Permission::EditStories));
//! # }
//! ```

use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::lookup::RoleLookup;
use super::state::RoleState;
use crate::permission::{Permission, PermissionTable};
use crate::types::{Identity, Role, UserId};

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How long a committed state is reused for the same identity
    pub cache_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Committed state plus the bookkeeping needed to order completions
#[derive(Debug)]
struct Slot {
    identity: Identity,
    state: RoleState,
    generation: u64,
    resolved_at: Option<Instant>,
}

/// Outcome of starting a resolution
enum Ticket {
    /// Answered without a lookup (anonymous, or cached)
    Ready(RoleState),
    /// Lookup required; commit only if `generation` is still current
    Lookup { user: UserId, generation: u64 },
}

/// Resolves and caches the role state of the current identity
///
/// Clones share the same state. Once every clone is dropped, lookups still
/// in flight from [`RoleResolver::spawn_resolve`] finish without committing.
#[derive(Clone)]
pub struct RoleResolver {
    lookup: Arc<dyn RoleLookup>,
    table: Arc<PermissionTable>,
    slot: Arc<RwLock<Slot>>,
    config: ResolverConfig,
}

impl RoleResolver {
    /// Create a resolver with the built-in permission table
    pub fn new(lookup: Arc<dyn RoleLookup>) -> Self {
        Self::with_config(lookup, PermissionTable::default(), ResolverConfig::default())
    }

    /// Create a resolver with a custom permission table and settings
    pub fn with_config(
        lookup: Arc<dyn RoleLookup>,
        table: PermissionTable,
        config: ResolverConfig,
    ) -> Self {
        Self {
            lookup,
            table: Arc::new(table),
            slot: Arc::new(RwLock::new(Slot {
                identity: None,
                state: RoleState::anonymous(),
                generation: 0,
                resolved_at: None,
            })),
            config,
        }
    }

    /// Resolve `identity` and commit the result
    ///
    /// Returns the state computed for `identity`. If the identity changed
    /// while the lookup was running, the result is returned but not
    /// committed; [`RoleResolver::snapshot`] keeps the newer identity's state.
    ///
    /// The lookup runs on its own task, so dropping this future does not
    /// leave the resolver loading: the result is still committed.
    pub async fn resolve(&self, identity: Identity) -> RoleState {
        let ticket = self.begin(identity, false);
        self.finish(ticket).await
    }

    /// Resolve `identity` in the background
    ///
    /// The loading state is committed before this returns. The task yields
    /// `None` when the resolver was dropped before the lookup finished.
    pub fn spawn_resolve(&self, identity: Identity) -> JoinHandle<Option<RoleState>> {
        let ticket = self.begin(identity, false);
        self.spawn_ticket(ticket)
    }

    /// Re-resolve the current identity, bypassing the cache
    pub async fn refresh(&self) -> RoleState {
        let ticket = self.begin(self.identity(), true);
        self.finish(ticket).await
    }

    fn spawn_ticket(&self, ticket: Ticket) -> JoinHandle<Option<RoleState>> {
        let lookup = Arc::clone(&self.lookup);
        let slot = Arc::downgrade(&self.slot);
        tokio::spawn(run_ticket(ticket, lookup, slot))
    }

    async fn finish(&self, ticket: Ticket) -> RoleState {
        let ticket = match ticket {
            Ticket::Ready(state) => return state,
            lookup => lookup,
        };
        match self.spawn_ticket(ticket).await {
            Ok(Some(state)) => state,
            Ok(None) => RoleState::anonymous(),
            Err(e) => {
                warn!("Role resolution task failed: {}", e);
                RoleState::anonymous()
            }
        }
    }

    /// Current committed state
    pub fn snapshot(&self) -> RoleState {
        self.slot.read().state.clone()
    }

    /// Identity the current state belongs to
    pub fn identity(&self) -> Identity {
        self.slot.read().identity.clone()
    }

    pub fn primary_role(&self) -> Role {
        self.slot.read().state.primary_role
    }

    pub fn is_loading(&self) -> bool {
        self.slot.read().state.is_loading
    }

    pub fn permission_table(&self) -> &PermissionTable {
        &self.table
    }

    /// Whether the current primary role holds `permission`
    pub fn check_permission(&self, permission: Permission) -> bool {
        self.table.grants(self.primary_role(), permission)
    }

    /// Whether the current primary role holds any of `permissions`
    pub fn check_any_permission(&self, permissions: &[Permission]) -> bool {
        self.table.grants_any(self.primary_role(), permissions)
    }

    /// Ask the lookup directly whether `identity` holds `role`
    ///
    /// Anonymous identities and failed lookups answer `false`.
    pub async fn check_has_role(&self, identity: &Identity, role: Role) -> bool {
        let Some(user) = identity else {
            return false;
        };

        match self.lookup.has_role(user, role).await {
            Ok(held) => held,
            Err(e) => {
                warn!("Role check for {} ({}) failed, denying: {}", user, role, e);
                false
            }
        }
    }

    /// Start a resolution under the write lock
    ///
    /// Bumping the generation and publishing the loading state happen
    /// together, so no reader sees a new identity with old roles.
    fn begin(&self, identity: Identity, force: bool) -> Ticket {
        let mut slot = self.slot.write();

        let Some(user) = identity else {
            slot.generation += 1;
            slot.identity = None;
            slot.state = RoleState::anonymous();
            slot.resolved_at = Some(Instant::now());
            return Ticket::Ready(slot.state.clone());
        };

        if !force && slot.identity.as_ref() == Some(&user) && !slot.state.is_loading {
            if let Some(resolved_at) = slot.resolved_at {
                if resolved_at.elapsed() <= self.config.cache_ttl {
                    return Ticket::Ready(slot.state.clone());
                }
            }
        }

        slot.generation += 1;
        slot.identity = Some(user.clone());
        slot.state = RoleState::loading();
        slot.resolved_at = None;

        debug!("Resolving roles for {} (generation {})", user, slot.generation);

        Ticket::Lookup {
            user,
            generation: slot.generation,
        }
    }
}

async fn run_ticket(
    ticket: Ticket,
    lookup: Arc<dyn RoleLookup>,
    slot: Weak<RwLock<Slot>>,
) -> Option<RoleState> {
    match ticket {
        Ticket::Ready(state) => Some(state),
        Ticket::Lookup { user, generation } => {
            let fetched = fetch_state(lookup.as_ref(), &user).await;
            let Some(slot) = slot.upgrade() else {
                debug!("Resolver dropped before roles for {} arrived", user);
                return None;
            };
            commit(&slot, generation, &fetched);
            Some(fetched.state)
        }
    }
}

/// Lookup result; failures are not cached
struct Fetched {
    state: RoleState,
    cacheable: bool,
}

/// Query the lookup and collapse the result, failing closed
async fn fetch_state(lookup: &dyn RoleLookup, user: &UserId) -> Fetched {
    match lookup.fetch_roles(user).await {
        Ok(assignments) => Fetched {
            state: RoleState::from_assignments(&assignments),
            cacheable: true,
        },
        Err(e) => {
            warn!("Role lookup for {} failed, falling back to user: {}", user, e);
            Fetched {
                state: RoleState::anonymous(),
                cacheable: false,
            }
        }
    }
}

/// Publish `fetched` if no newer resolution has started since `generation`
fn commit(slot: &RwLock<Slot>, generation: u64, fetched: &Fetched) -> bool {
    let mut slot = slot.write();
    if slot.generation != generation {
        debug!(
            "Discarding stale role resolution (generation {}, current {})",
            generation, slot.generation
        );
        return false;
    }

    debug!(
        "Committed role {} for {:?} (generation {})",
        fetched.state.primary_role, slot.identity, generation
    );
    slot.state = fetched.state.clone();
    slot.resolved_at = fetched.cacheable.then(Instant::now);
    true
}
