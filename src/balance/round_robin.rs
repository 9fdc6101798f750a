//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::balance::LoadBalanceStrategy;
use crate::registry::snapshot::SourceSnapshot;

/// Round-robin selector.
/// Stores an internal counter to rotate through candidates.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalanceStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select(&self, candidates: &[Arc<SourceSnapshot>]) -> Arc<SourceSnapshot> {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % candidates.len();
        candidates[index].clone()
    }
}
