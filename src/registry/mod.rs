//! Connection-source registry subsystem.
//!
//! # Data Flow
//! ```text
//! Request path (read-mostly, high frequency):
//!     RoutingContext (tenant, intent)
//!         → registry.lookup / acquire (sharded map read, config load)
//!         → group.pick(intent) (group-scoped lock, lazy GC of closed)
//!         → SourceSnapshot → caller leases from the pool via its driver
//!
//! Reconfiguration path (read-write, low frequency):
//!     full RouterConfig from the embedder
//!         → reconcile.rs diffs declared vs. live state
//!         → register / unregister / per-endpoint refresh
//!         → sweep() purges closed snapshots and invalid groups
//! ```
//!
//! # Design Decisions
//! - Lookup never blocks behind reconciliation for longer than a map-shard
//!   or group-list access; pool creation and close I/O run outside any lock
//!   the request path needs
//! - A snapshot's `closed` flag is monotonic, so selection can race a
//!   reconciliation pass safely
//! - Only the reconciler and register/unregister mutate group membership

pub mod group;
mod reconcile;
pub mod registry;
pub mod snapshot;

pub use group::{Role, SourceGroup};
pub use registry::SourceRegistry;
pub use snapshot::SourceSnapshot;
