//! Keeps the router and the store's history slice in step.
//!
//! Must be rendered inside `<Router>`.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::Store;
use crate::state::history::{full_location, sync_history_with_store};
use crate::state::store::NavigationKind;

#[component]
pub fn HistoryBridge() -> impl IntoView {
    let store = expect_context::<Store>();
    let history = sync_history_with_store(&store);
    let location = use_location();
    let navigate = use_navigate();

    // Router -> store. The full path, so query-only moves are seen too.
    Effect::new(move || {
        history.observe(full_location(&location.pathname.get(), &location.search.get(), &location.hash.get()));
    });

    // Store -> router.
    let pending = store.history_signal();
    Effect::new(move || {
        let Some(next) = pending.with(|h| h.pending.clone()) else {
            return;
        };
        navigate(
            &next.path,
            NavigateOptions { replace: next.kind == NavigationKind::Replace, ..NavigateOptions::default() },
        );
    });
}
