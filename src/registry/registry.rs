//! Concurrent connection-source registry.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::balance::{LoadBalanceStrategy, Random, RoundRobin};
use crate::binding::{
    DefaultGroupBinding, DefaultSchemaBinding, GroupBindingStrategy, SchemaBindingStrategy,
};
use crate::config::schema::{GroupConfig, RouterConfig, SourceConfig};
use crate::pool::{PoolAttributeComparator, PoolDriver, PoolError};
use crate::registry::group::{Role, SourceGroup};
use crate::registry::snapshot::SourceSnapshot;
use crate::routing::context::RoutingContext;
use crate::routing::error::RoutingError;

/// Top-level registry: the concurrent map from group name to live group,
/// plus the pluggable collaborators (pool drivers, load-balance strategies,
/// binding strategies, pool attribute comparators) the embedding
/// application registered.
///
/// Request paths (`lookup`, `acquire`) are lock-light: the name→group map
/// is sharded, the declared configuration is swapped atomically, and pool
/// creation/close I/O always runs outside any lock `lookup` needs.
pub struct SourceRegistry {
    groups: DashMap<String, Arc<SourceGroup>>,
    drivers: HashMap<String, Arc<dyn PoolDriver>>,
    balancers: HashMap<&'static str, Arc<dyn LoadBalanceStrategy>>,
    comparators: HashMap<String, Arc<dyn PoolAttributeComparator>>,
    group_binding: Arc<dyn GroupBindingStrategy>,
    schema_binding: Arc<dyn SchemaBindingStrategy>,
    config: ArcSwap<RouterConfig>,
}

impl SourceRegistry {
    /// Build an empty registry over the given pool drivers. Bring it live by
    /// handing the initial declared configuration to [`reconcile`].
    ///
    /// Default collaborators are installed up front: `random` and
    /// `round_robin` balance strategies and the config-driven binding
    /// policies. Override them before sharing the registry.
    ///
    /// [`reconcile`]: SourceRegistry::reconcile
    pub fn new(drivers: Vec<Arc<dyn PoolDriver>>) -> Self {
        let drivers = drivers
            .into_iter()
            .map(|driver| (driver.pool_type().to_string(), driver))
            .collect();

        let mut balancers: HashMap<&'static str, Arc<dyn LoadBalanceStrategy>> = HashMap::new();
        for strategy in [
            Arc::new(Random::new()) as Arc<dyn LoadBalanceStrategy>,
            Arc::new(RoundRobin::new()) as Arc<dyn LoadBalanceStrategy>,
        ] {
            balancers.insert(strategy.name(), strategy);
        }

        Self {
            groups: DashMap::new(),
            drivers,
            balancers,
            comparators: HashMap::new(),
            group_binding: Arc::new(DefaultGroupBinding),
            schema_binding: Arc::new(DefaultSchemaBinding),
            config: ArcSwap::from_pointee(RouterConfig::default()),
        }
    }

    /// Register a load-balance strategy under its own name, replacing any
    /// previous strategy with that name.
    pub fn register_balance_strategy(&mut self, strategy: Arc<dyn LoadBalanceStrategy>) {
        self.balancers.insert(strategy.name(), strategy);
    }

    /// Register a pool attribute comparator for its pool type.
    pub fn register_comparator(&mut self, comparator: Arc<dyn PoolAttributeComparator>) {
        self.comparators
            .insert(comparator.pool_type().to_string(), comparator);
    }

    pub fn set_group_binding(&mut self, strategy: Arc<dyn GroupBindingStrategy>) {
        self.group_binding = strategy;
    }

    pub fn set_schema_binding(&mut self, strategy: Arc<dyn SchemaBindingStrategy>) {
        self.schema_binding = strategy;
    }

    /// The declared configuration currently in effect.
    pub fn config(&self) -> Arc<RouterConfig> {
        self.config.load_full()
    }

    pub(crate) fn store_config(&self, config: RouterConfig) {
        self.config.store(Arc::new(config));
    }

    /// The live group registered under `name`, if any.
    pub fn group(&self, name: &str) -> Option<Arc<SourceGroup>> {
        self.groups.get(name).map(|entry| entry.value().clone())
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Build a group from its configuration and install it, replacing any
    /// existing entry under that name.
    ///
    /// Invalid configurations are skipped with a warning. Individually
    /// disabled sources are skipped; a per-source creation failure is logged
    /// and skipped without failing the rest of the group.
    pub fn register(&self, name: &str, config: &GroupConfig) {
        if config.is_invalid() {
            tracing::warn!(group = %name, "invalid configuration, group not created");
            return;
        }

        let balance = self.balance_strategy(name, config.load_balance.as_deref());
        let master = self.create_sources(name, Role::Master, config.master_slice());
        let slave = self.create_sources(name, Role::Slave, &config.slaves);

        let group = Arc::new(SourceGroup::new(
            name,
            config.schema_isolation,
            balance,
            master,
            slave,
        ));
        self.groups.insert(name.to_string(), group);
        tracing::info!(group = %name, "connection source group registered");
    }

    /// Close every non-closed snapshot in the group and, if the group is
    /// fully invalid afterwards, drop it from the registry.
    ///
    /// A snapshot that fails to close (including close-unsupported) does not
    /// stop the remaining closes; the group then stays registered in its
    /// partially-closed state so a later pass can finish the job rather than
    /// leaving an unreachable-but-live pool behind. The first failure is
    /// returned.
    pub fn unregister(&self, group: &Arc<SourceGroup>) -> Result<(), PoolError> {
        let mut first_failure = None;
        for role in [Role::Master, Role::Slave] {
            for snapshot in group.snapshots(role) {
                if snapshot.is_closed() {
                    continue;
                }
                if let Err(err) = self.close_snapshot(&snapshot) {
                    tracing::error!(
                        group = %group.name(),
                        endpoint = %snapshot.endpoint_key(),
                        error = %err,
                        "failed to close source"
                    );
                    first_failure.get_or_insert(err);
                }
            }
        }

        if group.is_invalid() {
            self.groups
                .remove_if(group.name(), |_, live| Arc::ptr_eq(live, group));
            tracing::info!(group = %group.name(), "connection source group unregistered");
        }

        match first_failure {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Resolve the group serving `tenant`.
    ///
    /// An explicit binding wins; a binding to a group that is not live is a
    /// hard error, never a silent fallthrough. Unbound tenants go through
    /// the fallback [`GroupBindingStrategy`]. A group known to be invalid is
    /// never returned.
    pub fn lookup(&self, tenant: &str) -> Result<Arc<SourceGroup>, RoutingError> {
        let config = self.config.load_full();

        if let Some(bound) = config.bindings.get(tenant).and_then(|b| b.group_name()) {
            let group = self
                .group(bound)
                .filter(|group| !group.is_invalid())
                .ok_or_else(|| RoutingError::BoundGroupMissing {
                    tenant: tenant.to_string(),
                    group: bound.to_string(),
                })?;
            tracing::debug!(tenant = %tenant, group = %bound, "explicit binding resolved");
            return Ok(group);
        }

        let group = self
            .group_binding
            .group_for(&self.groups, &config)
            .filter(|group| !group.is_invalid())
            .ok_or_else(|| RoutingError::NoGroupBound(tenant.to_string()))?;
        tracing::debug!(tenant = %tenant, group = %group.name(), "fallback binding resolved");
        Ok(group)
    }

    /// Resolve a connection source for the context's tenant and intent.
    ///
    /// Mirrors the group's schema-isolation flag into the context so the
    /// caller's query layer knows whether a schema switch is required.
    pub fn acquire(
        &self,
        ctx: &mut RoutingContext,
    ) -> Result<Arc<SourceSnapshot>, RoutingError> {
        let tenant = ctx.tenant().ok_or(RoutingError::TenantUnset)?.to_string();
        let group = self.lookup(&tenant)?;
        ctx.set_schema_isolation(group.schema_isolation());

        group
            .pick(ctx.intent())
            .ok_or_else(|| RoutingError::NoValidSource {
                group: group.name().to_string(),
                intent: ctx.intent(),
            })
    }

    /// The schema the tenant's sessions should target, or `None` when the
    /// tenant's group does not isolate schemas. Isolation enabled with no
    /// schema bound is a fatal routing error, not a silent default.
    pub fn resolve_schema(&self, tenant: &str) -> Result<Option<String>, RoutingError> {
        let group = self.lookup(tenant)?;
        if !group.schema_isolation() {
            return Ok(None);
        }
        let config = self.config.load_full();
        match self.schema_binding.schema_for(tenant, &config) {
            Some(schema) => {
                tracing::debug!(tenant = %tenant, schema = %schema, "schema binding resolved");
                Ok(Some(schema))
            }
            None => Err(RoutingError::SchemaUnbound(tenant.to_string())),
        }
    }

    /// Purge closed snapshots from every group and drop groups that became
    /// fully invalid. Runs after each reconciliation pass so the registry
    /// never accumulates dead entries.
    pub fn sweep(&self) {
        let mut dead = Vec::new();
        for entry in self.groups.iter() {
            entry.value().prune_closed();
            if entry.value().is_invalid() {
                dead.push(entry.key().clone());
            }
        }
        for name in dead {
            // re-check under the map lock; a concurrent register may have
            // replaced the entry with a live group
            if self.groups.remove_if(&name, |_, group| group.is_invalid()).is_some() {
                tracing::info!(group = %name, "invalid group removed");
            }
        }
    }

    pub(crate) fn balance_strategy(
        &self,
        group: &str,
        name: Option<&str>,
    ) -> Arc<dyn LoadBalanceStrategy> {
        let requested = name.unwrap_or("random");
        if let Some(strategy) = self.balancers.get(requested) {
            return strategy.clone();
        }
        tracing::warn!(
            group = %group,
            strategy = %requested,
            "unknown load-balance strategy, falling back to random"
        );
        self.balancers
            .get("random")
            .cloned()
            .unwrap_or_else(|| Arc::new(Random::new()))
    }

    /// Instantiate pools for the given source configurations. Disabled
    /// sources are skipped with a warning; creation failures are logged and
    /// skipped so one bad source never fails its siblings.
    pub(crate) fn create_sources(
        &self,
        group: &str,
        role: Role,
        configs: &[SourceConfig],
    ) -> Vec<Arc<SourceSnapshot>> {
        let mut snapshots = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.enabled {
                tracing::warn!(
                    group = %group,
                    role = %role.as_str(),
                    endpoint = %config.endpoint_key(),
                    "source is disabled and will not be created"
                );
                continue;
            }
            match self.create_snapshot(config) {
                Ok(snapshot) => {
                    tracing::info!(
                        group = %group,
                        role = %role.as_str(),
                        endpoint = %snapshot.endpoint_key(),
                        "pool created"
                    );
                    snapshots.push(Arc::new(snapshot));
                }
                Err(err) => {
                    tracing::error!(
                        group = %group,
                        role = %role.as_str(),
                        endpoint = %config.endpoint_key(),
                        error = %err,
                        "failed to create pool"
                    );
                }
            }
        }
        snapshots
    }

    fn create_snapshot(&self, config: &SourceConfig) -> Result<SourceSnapshot, PoolError> {
        let driver = self.driver_for(config.pool.as_deref())?;
        let pool = driver.create(config)?;
        Ok(SourceSnapshot::new(config.clone(), pool))
    }

    pub(crate) fn comparator(
        &self,
        pool_type: &str,
    ) -> Option<&Arc<dyn PoolAttributeComparator>> {
        self.comparators.get(pool_type)
    }

    pub(crate) fn close_snapshot(&self, snapshot: &SourceSnapshot) -> Result<(), PoolError> {
        let pool = snapshot.pool();
        let driver = self.driver_for(Some(pool.pool_type()))?;
        snapshot.close(driver.as_ref())
    }

    /// Driver for the given pool type; with a single registered driver a
    /// source may leave the pool type unset.
    fn driver_for(&self, pool_type: Option<&str>) -> Result<&Arc<dyn PoolDriver>, PoolError> {
        match pool_type {
            Some(name) => self
                .drivers
                .get(name)
                .ok_or_else(|| PoolError::UnknownPoolType(name.to_string())),
            None => {
                if self.drivers.len() == 1 {
                    if let Some(driver) = self.drivers.values().next() {
                        return Ok(driver);
                    }
                }
                Err(PoolError::UnknownPoolType(String::new()))
            }
        }
    }
}
