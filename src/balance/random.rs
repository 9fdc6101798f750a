//! Uniform random load balancing strategy.

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::balance::LoadBalanceStrategy;
use crate::registry::snapshot::SourceSnapshot;

/// Uniform random selector. The default strategy when a group names none.
#[derive(Debug)]
pub struct Random {
    rng: Mutex<SmallRng>,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Fixed-seed constructor so tests can pin the selection sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalanceStrategy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(&self, candidates: &[Arc<SourceSnapshot>]) -> Arc<SourceSnapshot> {
        let index = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..candidates.len());
        candidates[index].clone()
    }
}
