//! Subcommand handlers
//!
//! Each handler returns a JSON value for `main` to print.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use storynest_access::{
    AccessGuard, AuthState, Decision, InMemoryRoleLookup, Role, RoleResolver, RoleState, UserId,
};
use storynest_listing::{IncrementalList, PageInfo, Paginator, ScrollMetrics};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Pixel height of one synthetic list row
const ROW_HEIGHT_PX: f64 = 120.0;
/// Pixel height of the synthetic viewport
const VIEWPORT_PX: f64 = 800.0;

pub struct GuardOptions {
    pub path: String,
    pub role: Option<String>,
    pub anonymous: bool,
    pub auth_loading: bool,
    pub role_loading: bool,
    pub elapsed_ms: u64,
    pub fail_lookup: bool,
}

#[derive(Debug, Serialize)]
struct GuardReport {
    path: String,
    requirement: String,
    authenticated: bool,
    roles: RoleState,
    decision: Decision,
}

#[derive(Debug, Serialize)]
struct PageReport {
    #[serde(flatten)]
    info: PageInfo,
    items: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScrollStep {
    step: usize,
    triggered: bool,
    loaded_count: usize,
    total_count: usize,
    has_more: bool,
}

fn synthetic_items(total: usize) -> Vec<String> {
    (1..=total).map(|i| format!("story-{}", i)).collect()
}

/// Grants per role after configured overrides
pub fn lattice(config: &AppConfig) -> Result<Value> {
    let table = config.permission_table()?;
    table.validate()?;
    Ok(serde_json::to_value(table.to_matrix())?)
}

/// Resolve a synthetic identity and run the guard for `options.path`
pub async fn guard(config: &AppConfig, options: GuardOptions) -> Result<Value> {
    let table = config.permission_table()?;
    let routes = config.route_table()?;
    let lookup = Arc::new(InMemoryRoleLookup::new());

    let identity = if options.anonymous {
        None
    } else {
        let role: Role = match options.role.as_deref() {
            Some(name) => name.parse().context("Invalid --role")?,
            None => Role::default(),
        };
        let user = UserId::generate();
        lookup.grant(&user, role);
        if options.fail_lookup {
            lookup.fail_for(&user, "simulated lookup failure");
        }
        Some(user)
    };

    let resolver = RoleResolver::with_config(lookup, table.clone(), config.resolver_config());
    let mut roles = resolver.resolve(identity.clone()).await;
    if options.role_loading {
        roles = RoleState::loading();
    }
    debug!(role = %roles.primary_role, "Roles resolved");

    let auth = AuthState {
        is_loading: options.auth_loading,
        is_authenticated: identity.is_some(),
    };
    let guard = AccessGuard::with_config(table, config.guard_config());
    let requirement = routes.requirement_for(&options.path);
    let decision = guard.decide(
        &auth,
        &roles,
        &requirement,
        Duration::from_millis(options.elapsed_ms),
        &options.path,
    );
    info!(path = %options.path, requirement = %requirement, "Guard evaluated");

    Ok(serde_json::to_value(GuardReport {
        path: options.path,
        requirement: requirement.to_string(),
        authenticated: auth.is_authenticated,
        roles,
        decision,
    })?)
}

/// Select one page of a synthetic collection
pub fn paginate(config: &AppConfig, total: usize, page_size: Option<usize>, page: usize) -> Result<Value> {
    let page_size = page_size.unwrap_or(config.listing.page_size);
    let mut pager = Paginator::new(synthetic_items(total), page_size)?;
    pager.go_to_page(page);

    Ok(serde_json::to_value(PageReport {
        info: pager.info(),
        items: pager.page_items().to_vec(),
    })?)
}

/// Send `steps` near-bottom signals to an incremental list
pub async fn scroll(config: &AppConfig, total: usize, page_size: Option<usize>, steps: usize) -> Result<Value> {
    let mut list_config = config.list_config();
    if let Some(page_size) = page_size {
        list_config.page_size = page_size;
    }
    let list = IncrementalList::new(synthetic_items(total), list_config)?;
    let observer = config.scroll_observer()?;

    let mut report = Vec::with_capacity(steps);
    for step in 1..=steps {
        let content_height = list.loaded_count() as f64 * ROW_HEIGHT_PX;
        let metrics = ScrollMetrics::new((content_height - VIEWPORT_PX).max(0.0), VIEWPORT_PX, content_height);

        let triggered = match observer.observe(&metrics, &list) {
            Some(handle) => handle.await.context("Load-more task failed")?,
            None => false,
        };

        report.push(ScrollStep {
            step,
            triggered,
            loaded_count: list.loaded_count(),
            total_count: list.total_count(),
            has_more: list.has_more(),
        });
    }

    Ok(serde_json::to_value(report)?)
}
