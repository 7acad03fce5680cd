//! The application store.
//!
//! DESIGN
//! ======
//! A `Store` is a cheap cloneable handle; clones share one state tree and one
//! history slice, both held in reactive signals so components re-render on
//! change. Each constructed store gets a fresh [`StoreId`], which is how
//! re-renders prove they reuse the same instance.
//!
//! Only a handful of actions exist. Reducer design belongs to the
//! application; the bootstrap needs slice writes and navigation.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::{ArcRwSignal, GetUntracked, Update, WithUntracked};
use serde_json::Value;

use super::persist::{StateStorage, persist_slice};
use super::tree::{ONLINE_KEY, StateTree};
use crate::config::PersistConfig;
use crate::error::BootError;
use crate::net::Helpers;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one constructed store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

/// How a store-initiated navigation should touch browser history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    Push,
    Replace,
}

/// A navigation requested by the store that the router has not applied yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingNavigation {
    pub path: String,
    pub kind: NavigationKind,
}

/// Router slice of the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryState {
    pub location: String,
    pub pending: Option<PendingNavigation>,
}

/// Mutations the store understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// The router moved to `path`.
    LocationChanged { path: String },
    /// Navigate to `path`, adding a history entry.
    Push { path: String },
    /// Navigate to `path`, replacing the current history entry.
    Replace { path: String },
    SetSlice { name: String, value: Value },
    ClearSlice { name: String },
}

/// Storage sink for whitelisted slices.
#[derive(Clone)]
pub struct Persistor {
    pub config: PersistConfig,
    pub storage: Arc<dyn StateStorage>,
}

struct StoreInner {
    id: StoreId,
    state: ArcRwSignal<StateTree>,
    history: ArcRwSignal<HistoryState>,
    helpers: Helpers,
    persistor: Option<Persistor>,
}

/// Shared handle to the single application store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("id", &self.inner.id).finish_non_exhaustive()
    }
}

/// Construct the store for this session.
///
/// # Errors
///
/// Returns [`BootError::StoreConstruction`] if `initial` lacks the boolean
/// `online` flag or `location` is not an absolute path. There is no
/// recovery from this.
pub fn create_store(
    location: impl Into<String>,
    helpers: Helpers,
    initial: StateTree,
    persistor: Option<Persistor>,
) -> Result<Store, BootError> {
    let location = location.into();
    if initial.online().is_none() {
        return Err(BootError::StoreConstruction(format!("initial state lacks a boolean `{ONLINE_KEY}` flag")));
    }
    if !location.starts_with('/') {
        return Err(BootError::StoreConstruction(format!("location {location:?} is not an absolute path")));
    }

    let id = StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed));
    log::debug!("store {id:?} created with slices {:?}", initial.slice_names().collect::<Vec<_>>());

    Ok(Store {
        inner: Arc::new(StoreInner {
            id,
            state: ArcRwSignal::new(initial),
            history: ArcRwSignal::new(HistoryState { location, pending: None }),
            helpers,
            persistor,
        }),
    })
}

impl Store {
    pub fn id(&self) -> StoreId {
        self.inner.id
    }

    pub fn ptr_eq(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn helpers(&self) -> &Helpers {
        &self.inner.helpers
    }

    /// Reactive handle on the state tree.
    pub fn state_signal(&self) -> ArcRwSignal<StateTree> {
        self.inner.state.clone()
    }

    /// Reactive handle on the router slice.
    pub fn history_signal(&self) -> ArcRwSignal<HistoryState> {
        self.inner.history.clone()
    }

    /// Snapshot of the state tree without tracking.
    pub fn state(&self) -> StateTree {
        self.inner.state.get_untracked()
    }

    pub fn slice(&self, name: &str) -> Option<Value> {
        self.inner.state.with_untracked(|s| s.slice(name).cloned())
    }

    pub fn is_online(&self) -> bool {
        self.inner.state.with_untracked(|s| s.online().unwrap_or(false))
    }

    pub fn location(&self) -> String {
        self.inner.history.with_untracked(|h| h.location.clone())
    }

    pub fn pending_navigation(&self) -> Option<PendingNavigation> {
        self.inner.history.with_untracked(|h| h.pending.clone())
    }

    pub fn dispatch(&self, action: Action) {
        match action {
            Action::LocationChanged { path } => self.inner.history.update(|h| {
                if h.pending.as_ref().is_some_and(|p| p.path == path) {
                    h.pending = None;
                }
                h.location = path;
            }),
            Action::Push { path } => self.navigate(path, NavigationKind::Push),
            Action::Replace { path } => self.navigate(path, NavigationKind::Replace),
            Action::SetSlice { name, value } => {
                self.persist(&name, Some(&value));
                self.inner.state.update(|s| s.set_slice(name, value));
            }
            Action::ClearSlice { name } => {
                self.persist(&name, None);
                self.inner.state.update(|s| {
                    s.remove_slice(&name);
                });
            }
        }
    }

    /// Drop a pending navigation once the router has applied it.
    pub fn clear_pending_navigation(&self) {
        self.inner.history.update(|h| h.pending = None);
    }

    fn navigate(&self, path: String, kind: NavigationKind) {
        if self.location() == path {
            return;
        }
        self.inner.history.update(|h| {
            h.location.clone_from(&path);
            h.pending = Some(PendingNavigation { path, kind });
        });
    }

    fn persist(&self, slice: &str, value: Option<&Value>) {
        if let Some(p) = &self.inner.persistor {
            persist_slice(p.storage.as_ref(), &p.config, slice, value);
        }
    }
}

/// `Replace` bound to one store, handed to route loaders and guards.
#[derive(Clone, Debug)]
pub struct RedirectAction {
    store: Store,
}

impl RedirectAction {
    pub fn redirect(&self, path: impl Into<String>) {
        self.store.dispatch(Action::Replace { path: path.into() });
    }
}

/// Bind the redirect action creator to `store`.
pub fn bind_redirect(store: &Store) -> RedirectAction {
    RedirectAction { store: store.clone() }
}
