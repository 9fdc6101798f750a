//! Shared stubs for integration tests: a recording pool driver and
//! configuration builders.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tenant_router::config::{GroupConfig, RouterConfig, SourceConfig, TenantBinding};
use tenant_router::pool::{PoolDriver, PoolError, PoolHandle};
use tenant_router::SourceRegistry;

/// One recorded driver interaction, keyed by normalized endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Close(String),
}

#[derive(Debug)]
pub struct StubPool {
    endpoint: String,
}

impl PoolHandle for StubPool {
    fn pool_type(&self) -> &str {
        "stub"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pool driver that records every successful create/close and can be told
/// to fail creation per endpoint or refuse closing entirely.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<Call>>,
    fail_create: Mutex<HashSet<String>>,
    refuse_close: AtomicBool,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded calls, returning what happened since last drain.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Create(_)))
            .count()
    }

    pub fn closes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Close(_)))
            .count()
    }

    pub fn fail_create(&self, endpoint: &str) {
        self.fail_create
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(endpoint.to_string());
    }

    pub fn set_refuse_close(&self, refuse: bool) {
        self.refuse_close.store(refuse, Ordering::Relaxed);
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl PoolDriver for RecordingDriver {
    fn pool_type(&self) -> &str {
        "stub"
    }

    fn create(&self, config: &SourceConfig) -> Result<Arc<dyn PoolHandle>, PoolError> {
        let endpoint = config.endpoint_key();
        let should_fail = self
            .fail_create
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&endpoint);
        if should_fail {
            return Err(PoolError::Create {
                pool_type: "stub".into(),
                endpoint,
                reason: "injected failure".into(),
            });
        }
        self.record(Call::Create(endpoint.clone()));
        Ok(Arc::new(StubPool { endpoint }))
    }

    fn close(&self, handle: &dyn PoolHandle) -> Result<(), PoolError> {
        if self.refuse_close.load(Ordering::Relaxed) {
            return Err(PoolError::CloseUnsupported {
                pool_type: handle.pool_type().to_string(),
            });
        }
        self.record(Call::Close(handle.endpoint().to_string()));
        Ok(())
    }
}

pub fn registry(driver: &Arc<RecordingDriver>) -> SourceRegistry {
    SourceRegistry::new(vec![driver.clone() as Arc<dyn PoolDriver>])
}

pub fn source(url: &str) -> SourceConfig {
    SourceConfig {
        driver: "postgres".into(),
        url: url.into(),
        username: "app".into(),
        password: "secret".into(),
        pool: Some("stub".into()),
        ..Default::default()
    }
}

/// Group with one master and the given slaves, open to later modification.
pub fn group(master: &str, slaves: &[&str]) -> GroupConfig {
    GroupConfig {
        modify_allowed: true,
        master: Some(source(master)),
        slaves: slaves.iter().map(|url| source(url)).collect(),
        ..Default::default()
    }
}

pub fn config_with(groups: Vec<(&str, GroupConfig)>) -> RouterConfig {
    let mut config = RouterConfig::default();
    for (name, group) in groups {
        config.groups.insert(name.to_string(), group);
    }
    config
}

pub fn bind_group(config: &mut RouterConfig, tenant: &str, group: &str) {
    config.bindings.insert(
        tenant.to_string(),
        TenantBinding {
            group: Some(group.to_string()),
            ..Default::default()
        },
    );
}

pub fn bind_schema(config: &mut RouterConfig, tenant: &str, schema: &str) {
    config
        .bindings
        .entry(tenant.to_string())
        .or_default()
        .schema = Some(schema.to_string());
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
