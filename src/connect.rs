//! Data-prefetch boundary for matched routes.
//!
//! Each route lists async items. Blocking items are resolved before the
//! tree is hydrated; `deferred` items are left out of that wait and started
//! after mount. Items whose data is already in the store (for example from
//! server-injected state) are skipped.
//!
//! ERROR HANDLING
//! ==============
//! A failed load is logged and the render proceeds; the page shows whatever
//! the store holds.

#[cfg(test)]
#[path = "connect_test.rs"]
mod connect_test;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{LocalBoxFuture, join_all};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::net::Helpers;
use crate::net::api::Method;
use crate::routes::RenderProps;
use crate::state::store::{RedirectAction, bind_redirect};
use crate::state::{Action, Store};

/// Everything a loader may use.
#[derive(Clone, Debug)]
pub struct ConnectContext {
    pub store: Store,
    pub redirect: RedirectAction,
    pub params: HashMap<String, String>,
}

impl ConnectContext {
    pub fn new(store: &Store, params: HashMap<String, String>) -> Self {
        Self { store: store.clone(), redirect: bind_redirect(store), params }
    }

    pub fn helpers(&self) -> &Helpers {
        self.store.helpers()
    }
}

/// Fetches one piece of route data into the store.
pub trait DataLoader: Send + Sync {
    fn is_loaded(&self, store: &Store) -> bool;
    fn load<'a>(&'a self, ctx: &'a ConnectContext) -> LocalBoxFuture<'a, Result<(), ApiError>>;
}

/// A keyed data dependency of a route.
#[derive(Clone)]
pub struct AsyncItem {
    pub key: &'static str,
    /// Do not hold the first render for this item.
    pub deferred: bool,
    pub loader: Arc<dyn DataLoader>,
}

impl AsyncItem {
    pub fn blocking(key: &'static str, loader: Arc<dyn DataLoader>) -> Self {
        Self { key, deferred: false, loader }
    }

    pub fn deferred(key: &'static str, loader: Arc<dyn DataLoader>) -> Self {
        Self { key, deferred: true, loader }
    }
}

/// Items the first render waits for.
pub fn blocking_items(props: &RenderProps) -> Vec<AsyncItem> {
    props.entry.items.iter().filter(|item| !item.deferred).cloned().collect()
}

/// Items started after mount.
pub fn deferred_items(props: &RenderProps) -> Vec<AsyncItem> {
    props.entry.items.iter().filter(|item| item.deferred).cloned().collect()
}

/// Resolve `items` concurrently; returns the keys that actually loaded.
pub async fn load_items(items: &[AsyncItem], ctx: &ConnectContext) -> Vec<&'static str> {
    let pending: Vec<&AsyncItem> = items.iter().filter(|item| !item.loader.is_loaded(&ctx.store)).collect();
    let results = join_all(pending.iter().map(|item| item.loader.load(ctx))).await;

    let mut loaded = Vec::new();
    for (item, result) in pending.iter().zip(results) {
        match result {
            Ok(()) => loaded.push(item.key),
            Err(e) => log::warn!("route data {} failed to load: {e}", item.key),
        }
    }
    loaded
}

/// Loads `/loadInfo` into the `info` slice.
pub struct InfoLoader;

impl DataLoader for InfoLoader {
    fn is_loaded(&self, store: &Store) -> bool {
        store.slice("info").is_some_and(|info| info.get("loaded") == Some(&Value::Bool(true)))
    }

    fn load<'a>(&'a self, ctx: &'a ConnectContext) -> LocalBoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let data: Value = ctx.helpers().client.get("/loadInfo").await?;
            ctx.store.dispatch(Action::SetSlice { name: "info".to_owned(), value: json!({ "loaded": true, "data": data }) });
            Ok(())
        })
    }
}

/// Loads the message history into the `chat` slice.
pub struct ChatHistoryLoader;

impl DataLoader for ChatHistoryLoader {
    fn is_loaded(&self, store: &Store) -> bool {
        store.slice("chat").is_some_and(|chat| chat.get("messages").is_some_and(Value::is_array))
    }

    fn load<'a>(&'a self, ctx: &'a ConnectContext) -> LocalBoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let messages: Value = ctx.helpers().app.call(Method::Get, "/messages", None).await?;
            ctx.store.dispatch(Action::SetSlice { name: "chat".to_owned(), value: json!({ "messages": messages }) });
            Ok(())
        })
    }
}
