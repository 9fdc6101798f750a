//! Tenant-aware connection-source routing with hot reconfiguration.
//!
//! One application process serves many tenants, each potentially bound to a
//! different database, a different schema within a shared database, and a
//! master/replica pair for read/write splitting. The registry resolves a
//! tenant id plus read/write intent to a live connection pool, and
//! `reconcile` converges the live pools to a newly declared configuration
//! at runtime without breaking in-flight routing.

pub mod balance;
pub mod binding;
pub mod config;
pub mod pool;
pub mod registry;
pub mod routing;

pub use config::{load_config, ConfigError, RouterConfig};
pub use registry::{SourceGroup, SourceRegistry, SourceSnapshot};
pub use routing::{Intent, RoutingContext, RoutingError};
