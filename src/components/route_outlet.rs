//! Connect outlet: renders the route matched for the store's location.
//!
//! DESIGN
//! ======
//! The outlet re-matches whenever the history slice's location changes.
//! Guard redirects are applied from an effect, never from inside the view
//! closure, so a render never writes the signal it reads. After the first
//! location, each client-side navigation resolves the new route's async
//! items in the background.

use leptos::prelude::*;

use crate::connect::{ConnectContext, load_items};
use crate::pages::route_error::RouteErrorView;
use crate::routes::{MatchOutcome, RouteTable, match_routes};
use crate::state::{Action, Store};

#[component]
pub fn RouteOutlet() -> impl IntoView {
    let store = expect_context::<Store>();
    let routes = expect_context::<RouteTable>();
    let history = store.history_signal();

    {
        let store = store.clone();
        let routes = routes.clone();
        let history = history.clone();
        Effect::new(move |prev: Option<String>| {
            let location = history.with(|h| h.location.clone());
            match match_routes(&routes, &location) {
                MatchOutcome::Redirect(target) => {
                    log::info!("redirecting {location} -> {target}");
                    store.dispatch(Action::Replace { path: target });
                }
                MatchOutcome::Matched(props) if prev.as_ref().is_some_and(|p| *p != location) => {
                    let ctx = ConnectContext::new(&store, props.params);
                    let items = props.entry.items;
                    leptos::task::spawn_local(async move {
                        let loaded = load_items(&items, &ctx).await;
                        log::debug!("loaded {loaded:?} for {location}", location = ctx.store.location());
                    });
                }
                _ => {}
            }
            location
        });
    }

    move || {
        let location = history.with(|h| h.location.clone());
        match match_routes(&routes, &location) {
            MatchOutcome::Matched(props) => (props.entry.view)(),
            MatchOutcome::Redirect(_) => ().into_any(),
            MatchOutcome::Error(e) => {
                log::error!("route match failed: {e}");
                view! { <RouteErrorView message=e.to_string()/> }.into_any()
            }
        }
    }
}
