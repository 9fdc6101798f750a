//! Routing error definitions.

use thiserror::Error;

use crate::routing::context::Intent;

/// Errors surfaced when a connection source cannot be resolved for a tenant.
///
/// These reflect configuration or tenant-data problems, not transient
/// faults: they are returned to the caller and never retried internally. A
/// tenant with no resolvable source sees a hard failure, never degraded
/// routing to an arbitrary source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The routing context carries no tenant id.
    #[error("routing context has no tenant set")]
    TenantUnset,

    /// The tenant has no explicit binding and the fallback strategy could
    /// not pick a group (no default configured, more than one candidate).
    #[error("tenant {0} is not bound to a connection source group")]
    NoGroupBound(String),

    /// The tenant is explicitly bound to a group that is not live. An
    /// explicit misconfiguration must not silently fall through to another
    /// group.
    #[error("the connection source group {group} bound to tenant {tenant} does not exist")]
    BoundGroupMissing { tenant: String, group: String },

    /// The resolved group has no usable source for the requested intent.
    #[error("group {group} has no usable source for {intent:?} intent")]
    NoValidSource { group: String, intent: Intent },

    /// Schema isolation is enabled for the tenant's group but no schema is
    /// bound to the tenant.
    #[error("schema isolation is enabled for the group bound to tenant {0}, but no schema is bound")]
    SchemaUnbound(String),
}
