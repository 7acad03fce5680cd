use super::*;
use futures::executor::block_on;
use std::cell::Cell;

#[test]
fn injected_state_short_circuits_probe() {
    let probed = Cell::new(false);
    let online = block_on(resolve_connectivity(true, || {
        probed.set(true);
        async { false }
    }));
    assert!(online);
    assert!(!probed.get());
}

#[test]
fn without_injected_state_probe_decides() {
    assert!(block_on(resolve_connectivity(false, || async { true })));
    assert!(!block_on(resolve_connectivity(false, || async { false })));
}

#[test]
fn cache_busted_url_appends_stamp() {
    assert_eq!(cache_busted_url("/favicon.ico", 42), "/favicon.ico?_=42");
    assert_eq!(cache_busted_url("/ping?x=1", 7), "/ping?x=1&_=7");
}

#[test]
fn with_timeout_returns_value_when_future_wins() {
    let out = block_on(crate::net::with_timeout(async { 5 }, futures::future::pending()));
    assert_eq!(out, Some(5));
}

#[test]
fn with_timeout_returns_none_when_timer_wins() {
    let out = block_on(crate::net::with_timeout(futures::future::pending::<u8>(), async {}));
    assert_eq!(out, None);
}
