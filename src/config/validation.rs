//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (bindings and defaults reference existing groups)
//! - Flag enabled sources with missing connection attributes
//! - Detect duplicate endpoints within one group list
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs after normalization, before a config is accepted into the system

use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::schema::{GroupConfig, RouterConfig, SourceConfig};

/// A single semantic problem found in a declared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `default_group` names a group that is not declared.
    #[error("default group {0} is not declared")]
    UnknownDefaultGroup(String),

    /// A tenant binding names a group that is not declared.
    #[error("tenant {tenant} is bound to undeclared group {group}")]
    UnknownBindingGroup { tenant: String, group: String },

    /// An enabled source is missing a core connection attribute.
    #[error("{role} source {endpoint} in group {group} is missing driver, url, or credentials")]
    IncompleteSource {
        group: String,
        role: &'static str,
        endpoint: String,
    },

    /// Two entries in the same list resolve to the same endpoint identity.
    #[error("group {group} declares endpoint {endpoint} more than once")]
    DuplicateEndpoint { group: String, endpoint: String },
}

/// Validate a normalized configuration, collecting every error found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(default_group) = config.default_group.as_deref() {
        if !default_group.trim().is_empty() && !config.groups.contains_key(default_group) {
            errors.push(ValidationError::UnknownDefaultGroup(default_group.to_string()));
        }
    }

    for (tenant, binding) in &config.bindings {
        if let Some(group) = binding.group_name() {
            if !config.groups.contains_key(group) {
                errors.push(ValidationError::UnknownBindingGroup {
                    tenant: tenant.clone(),
                    group: group.to_string(),
                });
            }
        }
    }

    for (name, group) in &config.groups {
        if group.enabled {
            validate_group(name, group, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_group(name: &str, group: &GroupConfig, errors: &mut Vec<ValidationError>) {
    validate_sources(name, "master", group.master_slice(), errors);
    validate_sources(name, "slave", &group.slaves, errors);
}

fn validate_sources(
    group: &str,
    role: &'static str,
    sources: &[SourceConfig],
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = BTreeSet::new();
    for source in sources {
        if !source.enabled {
            continue;
        }
        let endpoint = source.endpoint_key();
        if !source.is_valid() {
            errors.push(ValidationError::IncompleteSource {
                group: group.to_string(),
                role,
                endpoint: endpoint.clone(),
            });
        }
        if !seen.insert(endpoint.clone()) {
            errors.push(ValidationError::DuplicateEndpoint {
                group: group.to_string(),
                endpoint,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{GroupConfig, SourceConfig, TenantBinding};

    fn source(url: &str) -> SourceConfig {
        SourceConfig {
            driver: "postgres".into(),
            url: url.into(),
            username: "app".into(),
            password: "secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn collects_every_error() {
        let mut config = RouterConfig {
            default_group: Some("missing".into()),
            ..Default::default()
        };
        config.bindings.insert(
            "acme".into(),
            TenantBinding {
                group: Some("ghost".into()),
                ..Default::default()
            },
        );
        let mut incomplete = source("postgres://db0/app");
        incomplete.password = String::new();
        config.groups.insert(
            "main".into(),
            GroupConfig {
                master: Some(incomplete),
                slaves: vec![
                    source("postgres://db1/app?a=1"),
                    source("postgres://db1/app?b=2"),
                ],
                ..Default::default()
            },
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::UnknownDefaultGroup("missing".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownBindingGroup { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::IncompleteSource { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateEndpoint { .. })));
    }

    #[test]
    fn disabled_sources_are_not_validated() {
        let mut config = RouterConfig::default();
        let dead = SourceConfig {
            enabled: false,
            ..Default::default()
        };
        config.groups.insert(
            "main".into(),
            GroupConfig {
                master: Some(source("postgres://db0/app")),
                slaves: vec![dead],
                ..Default::default()
            },
        );
        assert!(validate_config(&config).is_ok());
    }
}
