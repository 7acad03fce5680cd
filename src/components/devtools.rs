//! In-page state inspector, mounted in its own tree in development builds
//! when no browser dev-tools extension is present.

use leptos::prelude::*;

use crate::state::Store;

#[component]
pub fn DevTools() -> impl IntoView {
    let store = expect_context::<Store>();
    let state = store.state_signal();
    let history = store.history_signal();
    let open = RwSignal::new(false);

    let pretty = Signal::derive(move || {
        state.with(|s| serde_json::to_string_pretty(&s.to_value()).unwrap_or_else(|e| format!("<unprintable: {e}>")))
    });
    let location = Signal::derive(move || history.with(|h| h.location.clone()));

    view! {
        <aside class="devtools">
            <button class="devtools__toggle" on:click=move |_| open.update(|o| *o = !*o)>
                "store " {format!("{:?}", store.id())}
            </button>
            <Show when=move || open.get()>
                <p class="devtools__location">{move || location.get()}</p>
                <pre class="devtools__state">{move || pretty.get()}</pre>
            </Show>
        </aside>
    }
}
