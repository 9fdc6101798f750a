//! Connection-source group: master/slave snapshot lists with intent-aware
//! selection.

use std::sync::{Arc, PoisonError, RwLock};

use crate::balance::LoadBalanceStrategy;
use crate::registry::snapshot::SourceSnapshot;
use crate::routing::context::Intent;

/// Which list a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Slave => "slave",
        }
    }
}

/// A named group of connection sources serving one or more tenants: a
/// write-capable master list, a read-only slave list, and the load-balance
/// strategy that picks between candidates.
///
/// Each list is guarded by its own lock scoped to this group, so contention
/// on one tenant's group never stalls another's. List mutation happens only
/// through `append` (reconciler) and `prune_closed` (lazy GC); selection
/// runs concurrently and relies on the snapshot `closed` flag being
/// monotonic.
#[derive(Debug)]
pub struct SourceGroup {
    name: String,
    schema_isolation: bool,
    balance: Arc<dyn LoadBalanceStrategy>,
    master: RwLock<Vec<Arc<SourceSnapshot>>>,
    slave: RwLock<Vec<Arc<SourceSnapshot>>>,
}

impl SourceGroup {
    pub fn new(
        name: impl Into<String>,
        schema_isolation: bool,
        balance: Arc<dyn LoadBalanceStrategy>,
        master: Vec<Arc<SourceSnapshot>>,
        slave: Vec<Arc<SourceSnapshot>>,
    ) -> Self {
        Self {
            name: name.into(),
            schema_isolation,
            balance,
            master: RwLock::new(master),
            slave: RwLock::new(slave),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_isolation(&self) -> bool {
        self.schema_isolation
    }

    /// Pick one usable source for the given intent.
    ///
    /// Closed snapshots are dropped from both lists first (lazy garbage
    /// collection). Writes always select from the master list; reads select
    /// from the slave list, falling back to master when no slave is live.
    /// `None` means the caller must fail the operation, not retry silently;
    /// there is no fallback from master to slave for writes.
    pub fn pick(&self, intent: Intent) -> Option<Arc<SourceSnapshot>> {
        self.prune_closed();

        let slave = read_list(&self.slave);
        let use_master = intent == Intent::Write || slave.is_empty();
        if !use_master {
            tracing::debug!(group = %self.name, intent = ?intent, "selecting slave source");
            return Some(self.balance.select(&slave));
        }
        drop(slave);

        let master = read_list(&self.master);
        if master.is_empty() {
            if intent == Intent::Write {
                tracing::warn!(
                    group = %self.name,
                    "write requested but group has no live master source"
                );
            }
            return None;
        }
        tracing::debug!(group = %self.name, intent = ?intent, "selecting master source");
        Some(self.balance.select(&master))
    }

    /// A group is invalid iff neither list holds a non-closed snapshot.
    /// Invalid groups are eligible for removal from the registry. A group
    /// with a dead master list but live slaves stays valid (read-only).
    pub fn is_invalid(&self) -> bool {
        let master_dead = read_list(&self.master).iter().all(|s| s.is_closed());
        let slave_dead = read_list(&self.slave).iter().all(|s| s.is_closed());
        master_dead && slave_dead
    }

    /// Current snapshots of one list (closed entries included).
    pub fn snapshots(&self, role: Role) -> Vec<Arc<SourceSnapshot>> {
        read_list(self.list(role)).clone()
    }

    /// Drop closed snapshots from both lists.
    pub fn prune_closed(&self) {
        for role in [Role::Master, Role::Slave] {
            let mut list = self
                .list(role)
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            list.retain(|snapshot| !snapshot.is_closed());
        }
    }

    pub(crate) fn append(&self, role: Role, snapshots: Vec<Arc<SourceSnapshot>>) {
        if snapshots.is_empty() {
            return;
        }
        let mut list = self
            .list(role)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        list.extend(snapshots);
    }

    fn list(&self, role: Role) -> &RwLock<Vec<Arc<SourceSnapshot>>> {
        match role {
            Role::Master => &self.master,
            Role::Slave => &self.slave,
        }
    }
}

fn read_list(
    list: &RwLock<Vec<Arc<SourceSnapshot>>>,
) -> std::sync::RwLockReadGuard<'_, Vec<Arc<SourceSnapshot>>> {
    list.read().unwrap_or_else(PoisonError::into_inner)
}
