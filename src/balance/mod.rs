//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Group resolved for tenant
//!     → group.pick(intent) filters closed snapshots
//!     → Apply load balancing strategy over the surviving list:
//!         - random.rs (uniform random, the default)
//!         - round_robin.rs (rotate through sources)
//!     → Return one snapshot
//! ```
//!
//! # Design Decisions
//! - Strategies are pure selection: they never mutate the candidate list
//! - Strategy selection per group, by name from configuration
//! - Strategies must be deterministic under a fixed seed for testability
//! - Emptiness is the caller's problem: `select` is only invoked with a
//!   non-empty candidate list

pub mod random;
pub mod round_robin;

use std::sync::Arc;

use crate::registry::snapshot::SourceSnapshot;

/// Pluggable selection policy over a candidate list.
pub trait LoadBalanceStrategy: Send + Sync + std::fmt::Debug {
    /// Name this strategy is registered under, matched against the
    /// `load_balance` field of a group configuration.
    fn name(&self) -> &'static str;

    /// Pick one snapshot from a non-empty candidate list.
    fn select(&self, candidates: &[Arc<SourceSnapshot>]) -> Arc<SourceSnapshot>;
}

pub use random::Random;
pub use round_robin::RoundRobin;
