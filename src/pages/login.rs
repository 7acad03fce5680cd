//! Login page: exchanges an access token for a session.

use leptos::prelude::*;
use serde_json::json;

use crate::net::Helpers;
use crate::state::{Action, Store};

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = expect_context::<Store>();
    let helpers = expect_context::<Helpers>();
    let state = store.state_signal();

    let token = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let sign_in_store = store.clone();
    let sign_in_app = helpers.app.clone();
    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let value = token.get().trim().to_owned();
        if value.is_empty() {
            info.set("Enter an access token first.".to_owned());
            return;
        }
        busy.set(true);
        info.set("Signing in...".to_owned());

        let store = sign_in_store.clone();
        let app = sign_in_app.clone();
        leptos::task::spawn_local(async move {
            match app.sign_in(&value).await {
                Ok(session) => {
                    store.dispatch(Action::SetSlice { name: "auth".to_owned(), value: json!({ "user": session.user }) });
                    store.dispatch(Action::Push { path: "/chat".to_owned() });
                    info.set(String::new());
                }
                Err(e) => info.set(format!("Sign in failed: {e}")),
            }
            busy.set(false);
        });
    };

    let logout_store = store.clone();
    let logout_app = helpers.app.clone();
    let on_logout = move |_: leptos::ev::MouseEvent| {
        logout_app.logout();
        logout_store.dispatch(Action::ClearSlice { name: "auth".to_owned() });
    };

    let signed_in_as = Signal::derive(move || {
        state.with(|s| {
            s.auth_user().map(|user| {
                user.get("name")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown user")
                    .to_owned()
            })
        })
    });

    view! {
        <section class="login-page">
            <h1>"Login"</h1>
            <Show
                when=move || signed_in_as.with(Option::is_some)
                fallback=move || {
                    view! {
                        <form class="login-form" on:submit=on_submit.clone()>
                            <input
                                class="login-input"
                                type="password"
                                placeholder="Access token"
                                prop:value=move || token.get()
                                on:input=move |ev| token.set(event_target_value(&ev))
                            />
                            <button type="submit" disabled=move || busy.get()>"Sign in"</button>
                        </form>
                    }
                }
            >
                <p>"Signed in as " {move || signed_in_as.get().unwrap_or_default()}</p>
                <button on:click=on_logout.clone()>"Log out"</button>
            </Show>
            <p class="login-info">{move || info.get()}</p>
        </section>
    }
}
