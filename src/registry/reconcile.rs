//! Hot reconfiguration: converge live registry state to a newly declared
//! configuration.
//!
//! # Data Flow
//! ```text
//! embedder decides config changed
//!     → reconcile(new RouterConfig)
//!     → union of declared and live group names
//!     → per name: retire / skip (modify not allowed) / rebuild (isolation
//!       flip) / fine-grained per-endpoint diff / register fresh
//!     → swap stored config, sweep()
//! ```
//!
//! # Design Decisions
//! - Every close/create failure is logged and isolated to its own
//!   endpoint key; the pass never aborts partway
//! - Sources whose core and pool attributes are unchanged are left running:
//!   unrelated configuration churn must never force a reconnect storm
//! - A failed close defers the change: the old pool stays in place and the
//!   same diff re-applies on the next pass (idempotent reconciliation)

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::schema::{GroupConfig, RouterConfig, SourceConfig};
use crate::registry::group::{Role, SourceGroup};
use crate::registry::registry::SourceRegistry;
use crate::registry::snapshot::SourceSnapshot;

impl SourceRegistry {
    /// Diff `new_config` against live state and apply the difference.
    ///
    /// The configuration arrives in full on every change event; the
    /// registry diffs against its own live state rather than expecting
    /// incremental deltas. Running the same configuration twice performs no
    /// additional pool create/close work on the second pass.
    pub fn reconcile(&self, mut new_config: RouterConfig) {
        new_config.normalize();

        let mut names: BTreeSet<String> = new_config.groups.keys().cloned().collect();
        names.extend(self.group_names());

        for name in &names {
            let incoming = new_config.groups.get(name);
            let live = self.group(name);
            match (live, incoming) {
                // declared entry gone or unusable: retire the live group
                (Some(group), None) => self.retire(&group),
                (Some(group), Some(config)) if config.is_invalid() => self.retire(&group),

                (Some(group), Some(config)) => {
                    // a live group must opt in to being touched
                    if !config.modify_allowed {
                        tracing::debug!(group = %name, "modification not allowed, skipping");
                        continue;
                    }
                    // isolation mode changes which schema every outstanding
                    // connection should target; it cannot be hot-patched
                    if config.schema_isolation != group.schema_isolation() {
                        self.rebuild(name, &group, config);
                        continue;
                    }
                    self.refresh_group(&group, config);
                }

                // not yet live: register fresh (invalid entries warn inside)
                (None, Some(config)) => self.register(name, config),
                (None, None) => {}
            }
        }

        self.store_config(new_config);
        self.sweep();
    }

    fn retire(&self, group: &Arc<SourceGroup>) {
        if let Err(err) = self.unregister(group) {
            tracing::error!(
                group = %group.name(),
                error = %err,
                "failed to fully close retired group, keeping remainder for retry"
            );
        }
    }

    fn rebuild(&self, name: &str, group: &Arc<SourceGroup>, config: &GroupConfig) {
        tracing::info!(group = %name, "schema isolation changed, rebuilding group");
        if let Err(err) = self.unregister(group) {
            // re-registering over live pools would leak them; retry next pass
            tracing::error!(
                group = %name,
                error = %err,
                "failed to close group for rebuild, deferring"
            );
            return;
        }
        self.register(name, config);
    }

    fn refresh_group(&self, group: &Arc<SourceGroup>, incoming: &GroupConfig) {
        self.refresh_role(group, Role::Master, incoming.master_slice());
        self.refresh_role(group, Role::Slave, &incoming.slaves);
    }

    /// Per-endpoint diff of one list. Keys are normalized endpoint
    /// identities; on duplicates the first entry wins.
    fn refresh_role(&self, group: &Arc<SourceGroup>, role: Role, incoming: &[SourceConfig]) {
        let mut live: BTreeMap<String, Arc<SourceSnapshot>> = BTreeMap::new();
        for snapshot in group.snapshots(role) {
            if !snapshot.is_closed() {
                live.entry(snapshot.endpoint_key()).or_insert(snapshot);
            }
        }
        let mut declared: BTreeMap<String, &SourceConfig> = BTreeMap::new();
        for config in incoming {
            declared.entry(config.endpoint_key()).or_insert(config);
        }

        let mut keys: BTreeSet<&String> = live.keys().collect();
        keys.extend(declared.keys());

        for key in keys {
            match (live.get(key), declared.get(key)) {
                // endpoint dropped from the declared config
                (Some(snapshot), None) => {
                    self.close_one(group, snapshot);
                }
                // endpoint declared but switched off
                (Some(snapshot), Some(config)) if !config.enabled => {
                    self.close_one(group, snapshot);
                }
                (Some(snapshot), Some(config)) => {
                    if !self.source_changed(snapshot.config(), *config) {
                        continue;
                    }
                    tracing::info!(
                        group = %group.name(),
                        role = %role.as_str(),
                        endpoint = %key,
                        "source configuration changed, rebuilding pool"
                    );
                    // close old, then create fresh under the same key; a
                    // failed close defers the swap to the next pass
                    if self.close_one(group, snapshot) {
                        let fresh =
                            self.create_sources(group.name(), role, std::slice::from_ref(*config));
                        group.append(role, fresh);
                    }
                }
                (None, Some(config)) if config.enabled => {
                    let fresh =
                        self.create_sources(group.name(), role, std::slice::from_ref(*config));
                    group.append(role, fresh);
                }
                // declared but disabled and not live: nothing to do
                (None, Some(_)) => {}
                (None, None) => {}
            }
        }
    }

    fn close_one(&self, group: &Arc<SourceGroup>, snapshot: &Arc<SourceSnapshot>) -> bool {
        match self.close_snapshot(snapshot) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    group = %group.name(),
                    endpoint = %snapshot.endpoint_key(),
                    error = %err,
                    "failed to close source"
                );
                false
            }
        }
    }

    /// Whether the running pool behind `current` must be rebuilt to match
    /// `incoming`: any core connection attribute changed, the pool type
    /// changed, or the effective pool type's attribute bag changed (per the
    /// registered comparator, structural equality otherwise).
    fn source_changed(&self, current: &SourceConfig, incoming: &SourceConfig) -> bool {
        if current.core_modified(incoming) || current.pool != incoming.pool {
            return true;
        }
        let empty = crate::config::schema::PoolAttrs::new();
        let current_attrs = current.pool_attrs().unwrap_or(&empty);
        let incoming_attrs = incoming.pool_attrs().unwrap_or(&empty);
        match incoming.pool.as_deref().and_then(|t| self.comparator(t)) {
            Some(comparator) => comparator.changed(current_attrs, incoming_attrs),
            None => current_attrs != incoming_attrs,
        }
    }
}
