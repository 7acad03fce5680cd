//! Browser history kept in step with the store.
//!
//! The store's history slice is the single view of "where are we". Router
//! location changes flow in as `LocationChanged`; navigation requested from
//! code flows out through the pending-navigation slot, which the
//! `HistoryBridge` component hands to the router.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use super::store::{Action, Store};

/// Join location parts into the full path the store tracks.
///
/// `search` and `hash` may come with or without their leading `?`/`#`;
/// empty parts are dropped.
pub fn full_location(pathname: &str, search: &str, hash: &str) -> String {
    let search = search.strip_prefix('?').unwrap_or(search);
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    let mut path = if pathname.is_empty() { "/".to_owned() } else { pathname.to_owned() };
    if !search.is_empty() {
        path.push('?');
        path.push_str(search);
    }
    if !hash.is_empty() {
        path.push('#');
        path.push_str(hash);
    }
    path
}

/// History facade whose reads and writes go through the store.
#[derive(Clone, Debug)]
pub struct SyncedHistory {
    store: Store,
}

/// Tie a history facade to `store`.
pub fn sync_history_with_store(store: &Store) -> SyncedHistory {
    SyncedHistory { store: store.clone() }
}

impl SyncedHistory {
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    pub fn push(&self, path: impl Into<String>) {
        self.store.dispatch(Action::Push { path: path.into() });
    }

    pub fn replace(&self, path: impl Into<String>) {
        self.store.dispatch(Action::Replace { path: path.into() });
    }

    /// Record a location the router has already moved to.
    pub fn observe(&self, path: impl Into<String>) {
        self.store.dispatch(Action::LocationChanged { path: path.into() });
    }
}
