//! Routing behavior: tenant → group → source resolution.

use tenant_router::registry::Role;
use tenant_router::{Intent, RoutingContext, RoutingError};

mod common;
use common::{bind_group, bind_schema, config_with, group, registry, RecordingDriver};

#[test]
fn master_only_group_serves_both_intents() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![("g1", group("postgres://m1/app", &[]))]));

    let mut ctx = RoutingContext::for_tenant("acme");
    ctx.set_intent(Intent::Write);
    let picked = registry.acquire(&mut ctx).unwrap();
    assert_eq!(picked.endpoint_key(), "postgres://m1/app");

    let mut ctx = RoutingContext::for_tenant("acme");
    ctx.set_intent(Intent::Read);
    // slave list is empty: reads fall back to master
    let picked = registry.acquire(&mut ctx).unwrap();
    assert_eq!(picked.endpoint_key(), "postgres://m1/app");
}

#[test]
fn reads_prefer_slaves_and_writes_stay_on_master() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![(
        "g1",
        group("postgres://m1/app", &["postgres://s1/app"]),
    )]));

    let mut ctx = RoutingContext::for_tenant("acme");
    ctx.set_intent(Intent::Read);
    let picked = registry.acquire(&mut ctx).unwrap();
    assert_eq!(picked.endpoint_key(), "postgres://s1/app");

    ctx.set_intent(Intent::Write);
    let picked = registry.acquire(&mut ctx).unwrap();
    assert_eq!(picked.endpoint_key(), "postgres://m1/app");
}

#[test]
fn write_intent_pins_later_reads_to_master() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![(
        "g1",
        group("postgres://m1/app", &["postgres://s1/app"]),
    )]));

    let mut ctx = RoutingContext::for_tenant("acme");
    ctx.set_intent(Intent::Write);
    registry.acquire(&mut ctx).unwrap();

    // a read in the same unit of work must not see a stale replica
    ctx.set_intent(Intent::Read);
    let picked = registry.acquire(&mut ctx).unwrap();
    assert_eq!(picked.endpoint_key(), "postgres://m1/app");
}

#[test]
fn explicit_binding_to_missing_group_is_a_hard_error() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    let mut config = config_with(vec![("g1", group("postgres://m1/app", &[]))]);
    bind_group(&mut config, "acme", "missing");
    registry.reconcile(config);

    // even though exactly one other group exists, nothing falls through
    let err = registry.lookup("acme").unwrap_err();
    assert_eq!(
        err,
        RoutingError::BoundGroupMissing {
            tenant: "acme".into(),
            group: "missing".into(),
        }
    );
}

#[test]
fn unbound_tenant_uses_sole_group() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![("g1", group("postgres://m1/app", &[]))]));

    let group = registry.lookup("anyone").unwrap();
    assert_eq!(group.name(), "g1");
}

#[test]
fn unbound_tenant_uses_default_group_when_configured() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    let mut config = config_with(vec![
        ("g1", group("postgres://m1/app", &[])),
        ("g2", group("postgres://m2/app", &[])),
    ]);
    config.default_group = Some("g2".into());
    registry.reconcile(config);

    let group = registry.lookup("anyone").unwrap();
    assert_eq!(group.name(), "g2");
}

#[test]
fn ambiguous_fallback_fails_rather_than_guessing() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![
        ("g1", group("postgres://m1/app", &[])),
        ("g2", group("postgres://m2/app", &[])),
    ]));

    let err = registry.lookup("anyone").unwrap_err();
    assert_eq!(err, RoutingError::NoGroupBound("anyone".into()));
}

#[test]
fn acquire_requires_a_tenant() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![("g1", group("postgres://m1/app", &[]))]));

    let mut ctx = RoutingContext::new();
    assert_eq!(
        registry.acquire(&mut ctx).unwrap_err(),
        RoutingError::TenantUnset
    );
}

#[test]
fn acquire_mirrors_schema_isolation_into_context() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    let mut isolated = group("postgres://m1/app", &[]);
    isolated.schema_isolation = true;
    let mut config = config_with(vec![("g1", isolated)]);
    bind_schema(&mut config, "acme", "acme_schema");
    registry.reconcile(config);

    let mut ctx = RoutingContext::for_tenant("acme");
    registry.acquire(&mut ctx).unwrap();
    assert!(ctx.schema_isolation());
}

#[test]
fn schema_resolution() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    let mut isolated = group("postgres://m1/app", &[]);
    isolated.schema_isolation = true;
    let mut config = config_with(vec![("g1", isolated)]);
    bind_schema(&mut config, "acme", "acme_schema");
    registry.reconcile(config);

    // bound tenant resolves its schema
    assert_eq!(
        registry.resolve_schema("acme").unwrap().as_deref(),
        Some("acme_schema")
    );

    // isolation enabled but no schema bound: fatal, not a silent default
    assert_eq!(
        registry.resolve_schema("other").unwrap_err(),
        RoutingError::SchemaUnbound("other".into())
    );
}

#[test]
fn schema_resolution_is_disabled_without_isolation() {
    let driver = RecordingDriver::new();
    let registry = registry(&driver);
    let mut config = config_with(vec![("g1", group("postgres://m1/app", &[]))]);
    bind_schema(&mut config, "acme", "acme_schema");
    registry.reconcile(config);

    assert_eq!(registry.resolve_schema("acme").unwrap(), None);
}

#[test]
fn group_with_no_created_sources_is_never_returned() {
    let driver = RecordingDriver::new();
    driver.fail_create("postgres://m1/app");
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![("g1", group("postgres://m1/app", &[]))]));

    assert!(matches!(
        registry.lookup("acme").unwrap_err(),
        RoutingError::NoGroupBound(_)
    ));
}

#[test]
fn creation_failure_does_not_fail_sibling_sources() {
    let driver = RecordingDriver::new();
    driver.fail_create("postgres://s1/app");
    let registry = registry(&driver);
    registry.reconcile(config_with(vec![(
        "g1",
        group("postgres://m1/app", &["postgres://s1/app", "postgres://s2/app"]),
    )]));

    let group = registry.group("g1").unwrap();
    assert_eq!(group.snapshots(Role::Master).len(), 1);
    let slaves = group.snapshots(Role::Slave);
    assert_eq!(slaves.len(), 1);
    assert_eq!(slaves[0].endpoint_key(), "postgres://s2/app");
}
