use std::sync::Arc;

use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::config::BuildMode;
use crate::connect::{AsyncItem, InfoLoader};
use crate::pages;
use crate::routes::{RouteEntry, route_table};
use crate::state::create_store;
use crate::state::persist::MemoryStorage;
use crate::state::store::NavigationKind;
use crate::state::tree::StateTree;
use crate::test_support::{FakeChannel, FakeRenderHost, FakeTransport, helpers_with};

fn store_at(location: &str, initial: serde_json::Value, transport: &Arc<FakeTransport>) -> Store {
    let helpers = helpers_with(Arc::clone(transport), Arc::new(MemoryStorage::new()), FakeChannel::new());
    create_store(location, helpers, StateTree::from_value(initial).expect("object"), None).expect("store")
}

fn not_found_view() -> leptos::prelude::AnyView {
    use leptos::prelude::IntoAny;
    pages::not_found::NotFoundPage().into_any()
}

// =============================================================
// resolve_route
// =============================================================

#[test]
fn resolve_route_matches_without_redirect() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/login", json!({"online": true}), &transport);
    let props = resolve_route(&route_table(&store), &store).expect("route");
    assert_eq!(props.entry.name, "login");
    assert_eq!(store.pending_navigation(), None);
}

#[test]
fn resolve_route_follows_guard_redirect_before_render() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/chat", json!({"online": true}), &transport);
    let props = resolve_route(&route_table(&store), &store).expect("route");
    assert_eq!(props.entry.name, "login");
    assert_eq!(store.location(), "/login");
    let pending = store.pending_navigation().expect("pending navigation");
    assert_eq!(pending.kind, NavigationKind::Replace);
}

#[test]
fn resolve_route_gives_up_on_redirect_loop() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/a", json!({"online": true}), &transport);
    let table = RouteTable::new(vec![
        RouteEntry::new("/a", "a", not_found_view).guarded(Arc::new(|| Some("/b".to_owned()))),
        RouteEntry::new("/b", "b", not_found_view).guarded(Arc::new(|| Some("/a".to_owned()))),
    ]);
    let err = resolve_route(&table, &store).expect_err("loop");
    assert_eq!(err, RouteError::RedirectLoop("/a".to_owned()));
}

#[test]
fn resolve_route_reports_no_match() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/nowhere", json!({"online": true}), &transport);
    let err = resolve_route(&RouteTable::new(Vec::new()), &store).expect_err("no match");
    assert_eq!(err, RouteError::NoMatch("/nowhere".to_owned()));
}

// =============================================================
// render
// =============================================================

#[test]
fn render_loads_blocking_data_before_hydrating() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(200, r#"{"message":"hello"}"#);
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");

    assert_eq!(host.mount_count(), 1);
    assert_eq!(host.last_route(), Some("home"));
    assert_eq!(store.slice("info"), Some(json!({"loaded": true, "data": {"message": "hello"}})));
    assert_eq!(transport.requests()[0].url, "/api/loadInfo");
    assert_eq!(host.pending_tasks(), 0);
}

#[test]
fn render_skips_data_already_in_store() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": true, "info": {"loaded": true, "data": {}}}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");

    assert!(transport.requests().is_empty());
    assert_eq!(host.mount_count(), 1);
}

#[test]
fn render_proceeds_when_blocking_load_fails() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(500, "");
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");

    assert_eq!(host.last_route(), Some("home"));
    assert_eq!(store.slice("info"), None);
}

#[test]
fn offline_render_defers_blocking_loads_until_after_mount() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(200, r#"{"message":"cached"}"#);
    let store = store_at("/", json!({"online": false}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");

    assert_eq!(host.last_route(), Some("home"));
    assert!(transport.requests().is_empty(), "offline first render must not touch the network");
    assert_eq!(host.pending_tasks(), 1);

    host.run_spawned();
    assert_eq!(store.slice("info"), Some(json!({"loaded": true, "data": {"message": "cached"}})));
}

#[test]
fn offline_render_skips_data_restored_from_storage() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": false, "info": {"loaded": true, "data": {}}}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");
    host.run_spawned();

    assert!(transport.requests().is_empty());
    assert_eq!(host.mount_count(), 1);
}

#[test]
fn render_spawns_deferred_loads_after_mount() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(200, r#"[{"text":"hi"}]"#);
    let store = store_at("/chat", json!({"online": true, "auth": {"user": {"name": "ada"}}}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &route_table(&store), &store)).expect("render");

    assert_eq!(host.last_route(), Some("chat"));
    assert!(transport.requests().is_empty(), "deferred data must not hold the first render");
    assert_eq!(host.pending_tasks(), 1);

    host.run_spawned();
    assert_eq!(transport.requests()[0].url, "/api/messages");
    assert_eq!(store.slice("chat"), Some(json!({"messages": [{"text": "hi"}]})));
}

#[test]
fn render_mounts_error_view_on_match_error() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/x", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();

    block_on(render(host.as_ref(), &RouteTable::new(Vec::new()), &store)).expect("render");

    assert_eq!(host.mount_count(), 1);
    assert!(host.mounts.borrow()[0].route.is_err());
}

#[test]
fn render_propagates_mount_failure() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/login", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();
    host.fail_hydrate.set(true);

    let err = block_on(render(host.as_ref(), &route_table(&store), &store)).expect_err("fails");
    assert!(matches!(err, BootError::MountPointMissing(_)));
}

#[test]
fn render_passes_the_same_store_to_the_tree() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/login", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();
    let table = RouteTable::new(vec![
        RouteEntry::new("/login", "login", not_found_view).with_item(AsyncItem::deferred("info", Arc::new(InfoLoader))),
    ]);

    block_on(render(host.as_ref(), &table, &store)).expect("render");

    assert!(host.mounts.borrow()[0].store.ptr_eq(&store));
}

// =============================================================
// dev_checks
// =============================================================

fn dev_config(mode: BuildMode, devtools: bool) -> BootConfig {
    BootConfig { mode, devtools, ..BootConfig::default() }
}

#[test]
fn dev_checks_skip_everything_in_production() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();
    host.server_markup.set(false);

    dev_checks(host.as_ref(), &dev_config(BuildMode::Production, true), &store);

    assert_eq!(host.marker_checks.get(), 0);
    assert!(host.devtools_mounts.borrow().is_empty());
}

#[test]
fn dev_checks_verify_marker_in_development() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();
    host.server_markup.set(false);

    dev_checks(host.as_ref(), &dev_config(BuildMode::Development, false), &store);

    assert_eq!(host.marker_checks.get(), 1);
    assert!(host.devtools_mounts.borrow().is_empty());
}

#[test]
fn dev_checks_mount_devtools_without_extension() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();

    dev_checks(host.as_ref(), &dev_config(BuildMode::Development, true), &store);

    let mounts = host.devtools_mounts.borrow();
    assert_eq!(mounts.len(), 1);
    assert!(mounts[0].ptr_eq(&store));
}

#[test]
fn dev_checks_defer_to_installed_extension() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_at("/", json!({"online": true}), &transport);
    let host = FakeRenderHost::new();
    host.extension.set(true);

    dev_checks(host.as_ref(), &dev_config(BuildMode::Development, true), &store);

    assert!(host.devtools_mounts.borrow().is_empty());
}
