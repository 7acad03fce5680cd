//! Landing page showing server info and connectivity.

use leptos::prelude::*;

use crate::state::Store;

#[component]
pub fn HomePage() -> impl IntoView {
    let store = expect_context::<Store>();
    let state = store.state_signal();
    let online_state = state.clone();

    let info = move || {
        state.with(|s| {
            s.slice("info")
                .and_then(|info| info.get("data"))
                .and_then(|data| data.get("message"))
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| "No server info loaded.".to_owned(), str::to_owned)
        })
    };
    let status = move || {
        if online_state.with(|s| s.online().unwrap_or(false)) { "online" } else { "offline" }
    };

    view! {
        <section class="home-page">
            <h1>"Welcome"</h1>
            <p class="home-page__info">{info}</p>
            <p class="home-page__status">"You are " {status} "."</p>
        </section>
    }
}
