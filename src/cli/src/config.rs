//! Client configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use storynest_access::{
    GuardConfig, Permission, PermissionTable, ResolverConfig, Role, RouteRule, RouteTable,
};
use storynest_listing::{ListConfig, ScrollObserver};

/// Complete client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub guard: GuardSection,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub listing: ListingSection,

    #[serde(default)]
    pub scroll: ScrollSection,

    #[serde(default)]
    pub permissions: PermissionsSection,

    #[serde(default = "default_routes")]
    pub routes: Vec<RouteRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuardSection {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_not_found_path")]
    pub not_found_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverSection {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingSection {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollSection {
    #[serde(default = "default_threshold")]
    pub threshold_px: f64,
}

/// Per-permission minimum role overrides, by name
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PermissionsSection {
    #[serde(default)]
    pub minimums: BTreeMap<String, String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            login_path: default_login_path(),
            not_found_path: default_not_found_path(),
        }
    }
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self { cache_ttl_secs: default_cache_ttl() }
    }
}

impl Default for ListingSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl Default for ScrollSection {
    fn default() -> Self {
        Self { threshold_px: default_threshold() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSection::default(),
            guard: GuardSection::default(),
            resolver: ResolverSection::default(),
            listing: ListingSection::default(),
            scroll: ScrollSection::default(),
            permissions: PermissionsSection::default(),
            routes: default_routes(),
        }
    }
}

// Default value functions
fn default_log_level() -> String { "info".to_string() }
fn default_debounce() -> u64 { 100 }
fn default_login_path() -> String { "/auth".to_string() }
fn default_not_found_path() -> String { "/404".to_string() }
fn default_cache_ttl() -> u64 { 300 }
fn default_page_size() -> usize { 12 }
fn default_settle_delay() -> u64 { 300 }
fn default_threshold() -> f64 { 200.0 }
fn default_routes() -> Vec<RouteRule> { RouteTable::platform_default().rules().to_vec() }

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {:?}", path.as_ref()))?;

        let config: AppConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise the built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.listing.page_size == 0 {
            anyhow::bail!("listing.page_size must be at least 1");
        }

        self.scroll_observer()?;
        self.permission_table()?.validate()?;
        self.route_table()?;

        for rule in &self.routes {
            if let storynest_access::Requirement::Unrecognized(name) = &rule.requires {
                anyhow::bail!("Route {} requires unknown capability '{}'", rule.path, name);
            }
        }

        Ok(())
    }

    /// Built-in table with the configured overrides applied
    pub fn permission_table(&self) -> Result<PermissionTable> {
        let mut table = PermissionTable::default();
        for (permission, role) in &self.permissions.minimums {
            let permission: Permission = permission
                .parse()
                .with_context(|| format!("Invalid permissions.minimums key '{}'", permission))?;
            let role: Role = role
                .parse()
                .with_context(|| format!("Invalid minimum role for {}", permission))?;
            table = table.with_minimum(permission, role);
        }
        Ok(table)
    }

    pub fn route_table(&self) -> Result<RouteTable> {
        Ok(RouteTable::from_rules(self.routes.clone())?)
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            debounce: Duration::from_millis(self.guard.debounce_ms),
            login_path: self.guard.login_path.clone(),
            not_found_path: self.guard.not_found_path.clone(),
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cache_ttl: Duration::from_secs(self.resolver.cache_ttl_secs),
        }
    }

    pub fn list_config(&self) -> ListConfig {
        ListConfig {
            page_size: self.listing.page_size,
            settle_delay: Duration::from_millis(self.listing.settle_delay_ms),
        }
    }

    pub fn scroll_observer(&self) -> Result<ScrollObserver> {
        Ok(ScrollObserver::new(self.scroll.threshold_px)?)
    }
}
