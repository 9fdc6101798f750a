//! Per-unit-of-work routing state.

/// Read/write intent of the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// No operation classified yet; reads route like `Read`.
    #[default]
    Unspecified,
    Read,
    Write,
}

/// Routing state for one logical unit of work (typically one inbound
/// request): the tenant identity, the accumulated read/write intent, and
/// whether the resolved group requires schema isolation.
///
/// One instance per unit of work, owned and passed by the caller. Reusing a
/// context across units of work without `reset` leaks routing state.
#[derive(Debug, Clone, Default)]
pub struct RoutingContext {
    tenant: Option<String>,
    intent: Intent,
    schema_isolation: bool,
}

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pre-populated with a tenant id.
    pub fn for_tenant(tenant: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant.into()),
            ..Self::default()
        }
    }

    pub fn set_tenant(&mut self, tenant: impl Into<String>) {
        self.tenant = Some(tenant.into());
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Record the intent of the next operation.
    ///
    /// Write intent is sticky: once a write was recorded, later reads in the
    /// same unit of work keep routing to the master so they cannot observe
    /// stale replica state. Only `reset` clears it.
    pub fn set_intent(&mut self, intent: Intent) {
        if self.intent == Intent::Write && intent != Intent::Write {
            return;
        }
        self.intent = intent;
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Mirrors the resolved group's schema-isolation flag; set by
    /// `SourceRegistry::acquire` so the query layer knows whether to switch
    /// the session schema.
    pub fn set_schema_isolation(&mut self, enabled: bool) {
        self.schema_isolation = enabled;
    }

    pub fn schema_isolation(&self) -> bool {
        self.schema_isolation
    }

    /// Clear all state at unit-of-work end so a reused worker cannot leak
    /// tenant identity or intent into the next unit of work.
    pub fn reset(&mut self) {
        self.tenant = None;
        self.intent = Intent::Unspecified;
        self.schema_isolation = false;
    }
}
