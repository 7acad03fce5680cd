//! Shown when the current location cannot be resolved to a route.

use leptos::prelude::*;

#[component]
pub fn RouteErrorView(message: String) -> impl IntoView {
    view! {
        <section class="route-error" role="alert">
            <h1>"Something went wrong"</h1>
            <p>{message}</p>
        </section>
    }
}
