//! Role lookup collaborator

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{AccessError, Result};
use crate::types::{Role, RoleAssignment, UserId};

/// Backend query for a user's role assignments
#[async_trait]
pub trait RoleLookup: Send + Sync {
    /// All raw role assignments for `user`
    async fn fetch_roles(&self, user: &UserId) -> Result<Vec<RoleAssignment>>;

    /// Whether `user` holds exactly `role`
    async fn has_role(&self, user: &UserId, role: Role) -> Result<bool>;
}

/// In-memory lookup with optional latency and failure injection
///
/// Stands in for the hosted user_roles table in the CLI and in tests.
#[derive(Debug, Default)]
pub struct InMemoryRoleLookup {
    assignments: DashMap<UserId, Vec<RoleAssignment>>,
    latency: DashMap<UserId, Duration>,
    failures: DashMap<UserId, String>,
    calls: AtomicUsize,
}

impl InMemoryRoleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` to `user`
    pub fn grant(&self, user: &UserId, role: Role) {
        let mut entry = self.assignments.entry(user.clone()).or_default();
        if !entry.iter().any(|a| a.role == role) {
            entry.push(RoleAssignment::new(user.clone(), role));
        }
    }

    /// Remove `role` from `user`
    pub fn revoke(&self, user: &UserId, role: Role) {
        if let Some(mut entry) = self.assignments.get_mut(user) {
            entry.retain(|a| a.role != role);
        }
    }

    /// Delay every lookup for `user`
    pub fn set_latency(&self, user: &UserId, latency: Duration) {
        self.latency.insert(user.clone(), latency);
    }

    /// Make every lookup for `user` fail with `reason`
    pub fn fail_for(&self, user: &UserId, reason: impl Into<String>) {
        self.failures.insert(user.clone(), reason.into());
    }

    pub fn clear_failure(&self, user: &UserId) {
        self.failures.remove(user);
    }

    /// Number of lookups served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, user: &UserId) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency.get(user).map(|d| *d);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.failures.get(user) {
            Some(reason) => Err(AccessError::LookupFailed(reason.value().clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RoleLookup for InMemoryRoleLookup {
    async fn fetch_roles(&self, user: &UserId) -> Result<Vec<RoleAssignment>> {
        self.enter(user).await?;
        Ok(self
            .assignments
            .get(user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn has_role(&self, user: &UserId, role: Role) -> Result<bool> {
        self.enter(user).await?;
        Ok(self
            .assignments
            .get(user)
            .map(|entry| entry.iter().any(|a| a.role == role))
            .unwrap_or(false))
    }
}
