use super::*;
use crate::routes::{MatchOutcome, match_routes, route_table};
use crate::state::create_store;
use crate::state::persist::MemoryStorage;
use crate::state::tree::StateTree;
use crate::test_support::{FakeChannel, FakeTransport, helpers_with};
use futures::executor::block_on;

fn store_with(transport: &Arc<FakeTransport>, initial: Value) -> Store {
    let helpers = helpers_with(transport.clone(), Arc::new(MemoryStorage::new()), FakeChannel::new());
    create_store("/", helpers, StateTree::from_value(initial).expect("object"), None).expect("store")
}

fn props_for(store: &Store, location: &str) -> RenderProps {
    match match_routes(&route_table(store), location) {
        MatchOutcome::Matched(props) => props,
        other => panic!("expected match, got {other:?}"),
    }
}

// =============================================================
// Route items
// =============================================================

#[test]
fn home_has_one_blocking_item_and_no_deferred() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_with(&transport, json!({"online": true}));
    let props = props_for(&store, "/");
    assert_eq!(blocking_items(&props).iter().map(|i| i.key).collect::<Vec<_>>(), vec!["info"]);
    assert!(deferred_items(&props).is_empty());
}

#[test]
fn chat_history_is_deferred() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_with(&transport, json!({"online": true, "auth": {"user": {"name": "a"}}}));
    let props = props_for(&store, "/chat");
    assert!(blocking_items(&props).is_empty());
    assert_eq!(deferred_items(&props).iter().map(|i| i.key).collect::<Vec<_>>(), vec!["chat"]);
}

// =============================================================
// load_items
// =============================================================

#[test]
fn load_items_fills_store_slice() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(200, r#"{"message":"hello"}"#);
    let store = store_with(&transport, json!({"online": true}));
    let props = props_for(&store, "/");
    let ctx = ConnectContext::new(&store, props.params.clone());

    let loaded = block_on(load_items(&blocking_items(&props), &ctx));

    assert_eq!(loaded, vec!["info"]);
    assert_eq!(store.slice("info"), Some(json!({"loaded": true, "data": {"message": "hello"}})));
    assert_eq!(transport.requests()[0].url, "/api/loadInfo");
}

#[test]
fn load_items_skips_already_loaded_data() {
    let transport = Arc::new(FakeTransport::new());
    let store = store_with(&transport, json!({"online": true, "info": {"loaded": true}}));
    let props = props_for(&store, "/");
    let ctx = ConnectContext::new(&store, props.params.clone());

    let loaded = block_on(load_items(&blocking_items(&props), &ctx));

    assert!(loaded.is_empty());
    assert!(transport.requests().is_empty());
}

#[test]
fn failed_load_is_reported_not_fatal() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(500, "");
    let store = store_with(&transport, json!({"online": true}));
    let props = props_for(&store, "/");
    let ctx = ConnectContext::new(&store, props.params.clone());

    let loaded = block_on(load_items(&blocking_items(&props), &ctx));

    assert!(loaded.is_empty());
    assert_eq!(store.slice("info"), None);
}

#[test]
fn chat_loader_writes_messages() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(200, r#"[{"text":"hi"}]"#);
    let store = store_with(&transport, json!({"online": true, "auth": {"user": {"name": "a"}}}));
    let props = props_for(&store, "/chat");
    let ctx = ConnectContext::new(&store, props.params.clone());

    let loaded = block_on(load_items(&deferred_items(&props), &ctx));

    assert_eq!(loaded, vec!["chat"]);
    assert_eq!(store.slice("chat"), Some(json!({"messages": [{"text": "hi"}]})));
}
