//! Role resolution
//!
//! Collapses a user's raw role assignments into one primary role and keeps
//! that state in step with the current identity.

pub mod lookup;
pub mod resolver;
pub mod state;

pub use lookup::{InMemoryRoleLookup, RoleLookup};
pub use resolver::{ResolverConfig, RoleResolver};
pub use state::RoleState;
