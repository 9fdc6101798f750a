//! Default binding policies.

use std::sync::Arc;

use dashmap::DashMap;

use crate::binding::{GroupBindingStrategy, SchemaBindingStrategy};
use crate::config::schema::RouterConfig;
use crate::registry::group::SourceGroup;

/// Reads the per-tenant schema straight from the configured bindings.
#[derive(Debug, Default)]
pub struct DefaultSchemaBinding;

impl SchemaBindingStrategy for DefaultSchemaBinding {
    fn schema_for(&self, tenant: &str, config: &RouterConfig) -> Option<String> {
        config
            .bindings
            .get(tenant)
            .and_then(|binding| binding.schema.as_deref())
            .map(str::trim)
            .filter(|schema| !schema.is_empty())
            .map(str::to_string)
    }
}

/// Fallback group resolution: the configured default group if present, else
/// the sole live group, else none. Several candidates with no default is
/// ambiguous and must fail rather than guess.
#[derive(Debug, Default)]
pub struct DefaultGroupBinding;

impl GroupBindingStrategy for DefaultGroupBinding {
    fn group_for(
        &self,
        groups: &DashMap<String, Arc<SourceGroup>>,
        config: &RouterConfig,
    ) -> Option<Arc<SourceGroup>> {
        let default_group = config
            .default_group
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = default_group {
            return groups.get(name).map(|entry| entry.value().clone());
        }
        if groups.len() == 1 {
            return groups.iter().next().map(|entry| entry.value().clone());
        }
        None
    }
}
