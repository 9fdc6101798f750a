//! Configuration schema definitions.
//!
//! This module defines the declared routing configuration: connection-source
//! groups (one master, any number of slaves), tenant bindings, and pool
//! attribute bags. All types derive Serde traits for deserialization from
//! config files.
//!
//! A parsed `RouterConfig` must be normalized exactly once before use:
//! `normalize` folds global pool settings down into groups and sources and
//! lets slaves inherit driver/credentials from their group master. The
//! loader and the reconciler both do this, so configs obtained through
//! either path are ready for diffing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag for one pool type (free-form key/value settings).
pub type PoolAttrs = BTreeMap<String, serde_json::Value>;

/// Pool attribute bags keyed by pool-type name.
pub type PoolAttrMap = BTreeMap<String, PoolAttrs>;

/// Root configuration: everything the router needs to build and rebuild its
/// live registry state.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Group handed to tenants with no explicit binding.
    pub default_group: Option<String>,

    /// Pool-type name used by sources that do not name one themselves.
    pub default_pool: Option<String>,

    /// Connection-source groups, keyed by group name.
    pub groups: BTreeMap<String, GroupConfig>,

    /// Per-tenant bindings (group and/or schema), keyed by tenant id.
    pub bindings: BTreeMap<String, TenantBinding>,

    /// Global pool attribute bags, inherited by every group and source.
    pub pools: PoolAttrMap,
}

impl RouterConfig {
    /// Fold inheritable settings down the config tree. Idempotent.
    pub fn normalize(&mut self) {
        let global_pools = self.pools.clone();
        let default_pool = self.default_pool.clone();
        for group in self.groups.values_mut() {
            group.normalize(&global_pools, default_pool.as_deref());
        }
    }
}

/// Explicit binding from a tenant id to a group and/or a schema.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TenantBinding {
    /// Group the tenant routes to. Binding to a group that is not live is a
    /// hard routing error, never a silent fallthrough.
    pub group: Option<String>,

    /// Schema/catalog the tenant's sessions should target when the bound
    /// group has schema isolation enabled.
    pub schema: Option<String>,
}

impl TenantBinding {
    /// Bound group name, ignoring blank values.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

/// One master/slave group of connection sources.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GroupConfig {
    /// Disabled groups are treated as absent.
    pub enabled: bool,

    /// Whether a live group built from this entry may be mutated by a later
    /// reconciliation. Off by default: a group must opt in to being touched.
    pub modify_allowed: bool,

    /// Route tenants sharing this group to distinct schemas.
    pub schema_isolation: bool,

    /// Load-balance strategy name ("random" when unset).
    pub load_balance: Option<String>,

    /// Pool-type name inherited by sources in this group.
    pub pool: Option<String>,

    /// Group-level pool attribute bags, inherited by sources.
    pub pools: PoolAttrMap,

    /// Write-capable primary source.
    pub master: Option<SourceConfig>,

    /// Read-only replica sources.
    pub slaves: Vec<SourceConfig>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            modify_allowed: false,
            schema_isolation: false,
            load_balance: None,
            pool: None,
            pools: PoolAttrMap::new(),
            master: None,
            slaves: Vec::new(),
        }
    }
}

impl GroupConfig {
    /// A group is invalid when disabled, or when neither the master nor any
    /// slave is enabled. Invalid entries are skipped on registration and
    /// retire the live group during reconciliation.
    pub fn is_invalid(&self) -> bool {
        if !self.enabled {
            return true;
        }
        let master_dead = self.master.as_ref().map_or(true, |master| !master.enabled);
        master_dead && !self.slaves.iter().any(|slave| slave.enabled)
    }

    /// Master as a slice, for code that walks both roles uniformly.
    pub fn master_slice(&self) -> &[SourceConfig] {
        self.master.as_ref().map(std::slice::from_ref).unwrap_or(&[])
    }

    fn normalize(&mut self, parent_pools: &PoolAttrMap, default_pool: Option<&str>) {
        merge_pool_attrs(&mut self.pools, parent_pools);
        if self.pool.is_none() {
            self.pool = default_pool.map(str::to_string);
        }
        let master = self.master.clone();
        if let Some(master) = self.master.as_mut() {
            master.inherit_group(self.pool.as_deref(), &self.pools);
        }
        for slave in &mut self.slaves {
            slave.inherit_group(self.pool.as_deref(), &self.pools);
            if let Some(master) = master.as_ref() {
                slave.inherit_master(master);
            }
        }
    }
}

/// Configuration for a single connection source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Disabled sources are never instantiated; a live pool whose entry
    /// flips to disabled is closed on the next reconciliation.
    pub enabled: bool,

    /// Driver identity (database driver name).
    pub driver: String,

    /// Connection endpoint URL.
    pub url: String,

    pub username: String,

    pub password: String,

    /// Pool-type name; inherited from the group when unset.
    pub pool: Option<String>,

    /// Pool attribute bags keyed by pool type.
    pub pools: PoolAttrMap,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            driver: String::new(),
            url: String::new(),
            username: String::new(),
            password: String::new(),
            pool: None,
            pools: PoolAttrMap::new(),
        }
    }
}

impl SourceConfig {
    /// A source is usable only when every core connection attribute is set.
    pub fn is_valid(&self) -> bool {
        !self.driver.trim().is_empty()
            && !self.url.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
    }

    /// Whether any core connection attribute (driver, endpoint, credentials)
    /// differs from `other`. Pool attributes are compared separately.
    pub fn core_modified(&self, other: &SourceConfig) -> bool {
        self.driver != other.driver
            || self.url != other.url
            || self.username != other.username
            || self.password != other.password
    }

    /// Normalized endpoint identity: the URL stripped of query and fragment.
    /// Two entries with the same key are the same physical endpoint for
    /// diffing purposes, regardless of connection parameters.
    pub fn endpoint_key(&self) -> String {
        let raw = self.url.trim();
        match url::Url::parse(raw) {
            Ok(mut parsed) => {
                parsed.set_query(None);
                parsed.set_fragment(None);
                parsed.to_string()
            }
            Err(_) => raw.split(['?', '#']).next().unwrap_or(raw).to_string(),
        }
    }

    /// Attribute bag for this source's effective pool type.
    pub fn pool_attrs(&self) -> Option<&PoolAttrs> {
        self.pool.as_deref().and_then(|pool_type| self.pools.get(pool_type))
    }

    fn inherit_group(&mut self, group_pool: Option<&str>, group_pools: &PoolAttrMap) {
        merge_pool_attrs(&mut self.pools, group_pools);
        if self.pool.is_none() {
            self.pool = group_pool.map(str::to_string);
        }
    }

    /// Slaves typically share the master's driver and credentials; blank
    /// fields fall back to the master's values.
    fn inherit_master(&mut self, master: &SourceConfig) {
        if self.driver.trim().is_empty() {
            self.driver = master.driver.clone();
        }
        if self.username.trim().is_empty() {
            self.username = master.username.clone();
        }
        if self.password.trim().is_empty() {
            self.password = master.password.clone();
        }
    }
}

/// Merge `parent` attribute bags into `child`; child keys win.
fn merge_pool_attrs(child: &mut PoolAttrMap, parent: &PoolAttrMap) {
    for (pool_type, attrs) in parent {
        let target = child.entry(pool_type.clone()).or_default();
        for (key, value) in attrs {
            target.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
