//! Route table and location matching.
//!
//! The table is rebuilt from the store on every (re-)render so guards see
//! the live store. Matching is first-match over the table's order:
//! static segments, `:param` captures, and a trailing `*` that swallows the
//! rest of the path.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::HashMap;
use std::sync::Arc;

use leptos::prelude::{AnyView, IntoAny};

use crate::connect::{AsyncItem, ChatHistoryLoader, InfoLoader};
use crate::error::RouteError;
use crate::pages;
use crate::state::Store;

/// Returns a redirect target when the route must not render.
pub type Guard = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Builds a route's view.
pub type ViewFn = fn() -> AnyView;

/// One entry of the route table.
#[derive(Clone)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub name: &'static str,
    pub view: ViewFn,
    pub guard: Option<Guard>,
    /// Data dependencies resolved by the connect boundary.
    pub items: Vec<AsyncItem>,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("guarded", &self.guard.is_some())
            .field("items", &self.items.len())
            .finish()
    }
}

impl RouteEntry {
    pub fn new(pattern: &'static str, name: &'static str, view: ViewFn) -> Self {
        Self { pattern, name, view, guard: None, items: Vec::new() }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_item(mut self, item: AsyncItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Ordered, shareable route table.
#[derive(Clone, Debug)]
pub struct RouteTable(Arc<[RouteEntry]>);

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self(entries.into())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.0
    }
}

/// What the router should render for a location.
#[derive(Clone, Debug)]
pub struct RenderProps {
    pub location: String,
    pub entry: RouteEntry,
    pub params: HashMap<String, String>,
}

/// Result of matching a location.
#[derive(Clone, Debug)]
pub enum MatchOutcome {
    Matched(RenderProps),
    Redirect(String),
    Error(RouteError),
}

/// Redirect to `/login` unless the store holds an authenticated user.
pub fn require_login(store: &Store) -> Guard {
    let store = store.clone();
    Arc::new(move || {
        let signed_in = store.state().auth_user().is_some();
        (!signed_in).then(|| "/login".to_owned())
    })
}

/// The application's routes, with guards bound to `store`.
pub fn route_table(store: &Store) -> RouteTable {
    RouteTable::new(vec![
        RouteEntry::new("/", "home", || pages::home::HomePage().into_any())
            .with_item(AsyncItem::blocking("info", Arc::new(InfoLoader))),
        RouteEntry::new("/login", "login", || pages::login::LoginPage().into_any()),
        RouteEntry::new("/chat", "chat", || pages::chat::ChatPage().into_any())
            .guarded(require_login(store))
            .with_item(AsyncItem::deferred("chat", Arc::new(ChatHistoryLoader))),
        RouteEntry::new("*", "not-found", || pages::not_found::NotFoundPage().into_any()),
    ])
}

/// Drop the query string and fragment from a location.
pub fn location_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// Match `path` against `pattern`, returning captured params.
pub fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let mut params = HashMap::new();
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some("*"), rest) => {
                let mut tail: Vec<&str> = rest.into_iter().collect();
                tail.extend(path_segments);
                params.insert("*".to_owned(), tail.join("/"));
                return Some(params);
            }
            (Some(p), Some(s)) if p.starts_with(':') => {
                params.insert(p[1..].to_owned(), s.to_owned());
            }
            (Some(p), Some(s)) if p == s => {}
            _ => return None,
        }
    }
}

/// Resolve `location` against `table`.
pub fn match_routes(table: &RouteTable, location: &str) -> MatchOutcome {
    let path = location_path(location);
    for entry in table.entries() {
        let Some(params) = match_pattern(entry.pattern, path) else {
            continue;
        };
        if let Some(target) = entry.guard.as_ref().and_then(|guard| guard()) {
            if target != path {
                return MatchOutcome::Redirect(target);
            }
        }
        return MatchOutcome::Matched(RenderProps { location: location.to_owned(), entry: entry.clone(), params });
    }
    MatchOutcome::Error(RouteError::NoMatch(path.to_owned()))
}
