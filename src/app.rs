//! Root application component.
//!
//! Wraps the route outlet in the state-provider boundary and the router
//! boundary. The same `Store` is passed in on every render, so a re-render
//! after a live update keeps the session's state.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{A, Router};

use crate::components::devtools::DevTools;
use crate::components::history_bridge::HistoryBridge;
use crate::components::provider::Provider;
use crate::components::route_outlet::RouteOutlet;
use crate::components::scroll::ScrollRestoration;
use crate::routes::RouteTable;
use crate::state::Store;

#[component]
pub fn App(store: Store, routes: RouteTable) -> impl IntoView {
    provide_meta_context();
    provide_context(routes);

    view! {
        <Title text="Boilerplate"/>
        <Provider store=store>
            <div data-ssr-root="" class="app">
                <Router>
                    <HistoryBridge/>
                    <ScrollRestoration/>
                    <nav class="app__nav">
                        <A href="/">"Home"</A>
                        <A href="/chat">"Chat"</A>
                        <A href="/login">"Login"</A>
                    </nav>
                    <main class="app__main">
                        <RouteOutlet/>
                    </main>
                </Router>
            </div>
        </Provider>
    }
}

/// Standalone dev-tools tree: provider boundary only, no router.
#[component]
pub fn DevToolsRoot(store: Store) -> impl IntoView {
    view! {
        <Provider store=store>
            <DevTools/>
        </Provider>
    }
}
