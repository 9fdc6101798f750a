//! Tenant binding subsystem.
//!
//! # Data Flow
//! ```text
//! lookup(tenant)
//!     → explicit binding in config? → that group, or a hard error if absent
//!     → otherwise GroupBindingStrategy picks a fallback group (or none)
//!
//! query layer switching schemas
//!     → SchemaBindingStrategy resolves tenant → schema name
//!     → none + isolation required = hard routing error, never a default
//! ```
//!
//! # Design Decisions
//! - Strategies are constructed by the embedding application and passed in
//!   explicitly; there is no implicit discovery
//! - Strategies are stateless: the current configuration is an argument, so
//!   a hot reload is visible on the next call without re-registration
//! - Ambiguity fails: with several groups and no default, the fallback
//!   strategy returns none rather than guessing

pub mod default;

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::schema::RouterConfig;
use crate::registry::group::SourceGroup;

/// Resolves a tenant id to an explicitly bound schema name.
pub trait SchemaBindingStrategy: Send + Sync {
    /// The schema bound to `tenant`, or `None` when unconfigured. The caller
    /// decides whether a missing schema is fatal (it is when the tenant's
    /// group has schema isolation enabled).
    fn schema_for(&self, tenant: &str, config: &RouterConfig) -> Option<String>;
}

/// Resolves the fallback connection-source group for tenants with no
/// explicit binding.
pub trait GroupBindingStrategy: Send + Sync {
    /// Pick a group from the live set, or `None` when no unambiguous choice
    /// exists.
    fn group_for(
        &self,
        groups: &DashMap<String, Arc<SourceGroup>>,
        config: &RouterConfig,
    ) -> Option<Arc<SourceGroup>>;
}

pub use default::{DefaultGroupBinding, DefaultSchemaBinding};
