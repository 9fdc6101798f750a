//! Pool driver boundary.
//!
//! # Responsibilities
//! - Define the contract the router consumes from concrete pool
//!   implementations: create a pool from a source configuration, close it
//! - Distinguish "this pool type cannot be closed cleanly" from a transient
//!   close failure; the former is never retried
//! - Expose the per-pool-type attribute comparison hook used by the
//!   reconciler's fine-grained diff
//!
//! # Design Decisions
//! - The router never opens or leases connections itself; callers borrow
//!   from the pool through the driver's own lease interface
//! - Drivers are registered explicitly on the registry by pool-type name,
//!   never discovered implicitly
//! - Creation and close are synchronous best-effort calls; retries, if any,
//!   belong to the embedding application

use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{PoolAttrs, SourceConfig};

/// A live connection pool produced by a [`PoolDriver`].
///
/// The router tracks identity and lifecycle only; leasing connections out
/// of the pool is the driver's business.
pub trait PoolHandle: Send + Sync + std::fmt::Debug {
    /// Pool-type name of the driver that created this handle.
    fn pool_type(&self) -> &str;

    /// The normalized endpoint this pool connects to.
    fn endpoint(&self) -> &str;
}

/// Creates and destroys concrete pools for one pool type.
pub trait PoolDriver: Send + Sync {
    /// Pool-type name this driver is registered under.
    fn pool_type(&self) -> &str;

    /// Build a pool from a source configuration.
    fn create(&self, config: &SourceConfig) -> Result<Arc<dyn PoolHandle>, PoolError>;

    /// Shut down a pool previously produced by this driver. Pool types with
    /// no clean shutdown return [`PoolError::CloseUnsupported`].
    fn close(&self, handle: &dyn PoolHandle) -> Result<(), PoolError>;
}

/// Decides whether a pool attribute change requires rebuilding the pool.
///
/// Consulted by the reconciler when a source's core connection attributes
/// are unchanged; without a registered comparator the attribute bags are
/// compared structurally.
pub trait PoolAttributeComparator: Send + Sync {
    /// Pool-type name this comparator is registered under.
    fn pool_type(&self) -> &str;

    /// True if moving from `current` to `incoming` requires a rebuild.
    fn changed(&self, current: &PoolAttrs, incoming: &PoolAttrs) -> bool;
}

/// Pool lifecycle failures. Logged and isolated to the affected source;
/// never aborts a reconciliation pass or the registration of sibling
/// sources in the same group.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The driver could not build a pool from the supplied configuration.
    #[error("failed to create {pool_type} pool for {endpoint}: {reason}")]
    Create {
        pool_type: String,
        endpoint: String,
        reason: String,
    },

    /// The pool type has no clean shutdown. Distinct from a transient close
    /// failure; never retried.
    #[error("{pool_type} pools do not support being closed")]
    CloseUnsupported { pool_type: String },

    /// Transient close failure; a later reconciliation retries the close.
    #[error("failed to close pool for {endpoint}: {reason}")]
    Close { endpoint: String, reason: String },

    /// A source named a pool type with no registered driver.
    #[error("no driver registered for pool type {0:?}")]
    UnknownPoolType(String),
}
