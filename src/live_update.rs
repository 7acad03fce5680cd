//! Development live update: rebuild the route table and re-render when the
//! dev server reports changed route modules.
//!
//! The re-render reuses the session's store, and with it the channel and
//! history. Nothing is reconstructed and the channel is not reopened.

#[cfg(test)]
#[path = "live_update_test.rs"]
mod live_update_test;

use futures::StreamExt;
use futures::stream::LocalBoxStream;
use serde_json::Value;

use crate::hydration::{RenderHost, render};
use crate::routes::route_table;
use crate::state::Store;

/// Source of "routes changed" notifications.
pub trait LiveUpdateSource {
    fn changes(&self) -> LocalBoxStream<'static, ()>;
}

/// Websocket URL of the cargo-leptos live-reload server.
pub fn live_reload_url(hostname: &str, port: u16) -> String {
    format!("ws://{hostname}:{port}/live_reload")
}

/// Whether a cargo-leptos live-reload message touches the view code.
///
/// Messages are JSON objects; `view` and `all` mean the WASM bundle changed,
/// `css` alone only restyles.
pub fn is_route_change(message: &str) -> bool {
    match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(map)) => map.contains_key("view") || map.contains_key("all"),
        Ok(_) => false,
        Err(e) => {
            log::debug!("ignoring live-reload message: {e}");
            false
        }
    }
}

/// Re-render on every change until the source ends. Returns the number of
/// re-renders performed.
pub async fn watch<H: RenderHost + ?Sized>(mut changes: LocalBoxStream<'static, ()>, host: &H, store: &Store) -> usize {
    let mut renders = 0;
    while changes.next().await.is_some() {
        log::info!("route modules changed, re-rendering");
        let routes = route_table(store);
        match render(host, &routes, store).await {
            Ok(()) => renders += 1,
            Err(e) => log::error!("live update render failed: {e}"),
        }
    }
    renders
}
