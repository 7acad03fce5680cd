//! Chat page: message history from the store, new messages over the
//! realtime channel.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use leptos::prelude::*;
use serde_json::{Value, json};

use crate::net::channel::ChannelHandle;
use crate::state::{Action, Store};

/// Append `message` to the `chat.messages` array of `chat`.
fn with_message(chat: Option<Value>, message: Value) -> Value {
    let mut messages = chat
        .as_ref()
        .and_then(|c| c.get("messages"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    messages.push(message);
    json!({ "messages": messages })
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let store = expect_context::<Store>();
    let channel = expect_context::<ChannelHandle>();
    let state = store.state_signal();
    let draft = RwSignal::new(String::new());

    let messages = move || {
        state.with(|s| {
            s.slice("chat")
                .and_then(|c| c.get("messages"))
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .map(|m| m.get("text").and_then(Value::as_str).unwrap_or_default().to_owned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };

    let on_send = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = draft.get().trim().to_owned();
        if text.is_empty() {
            return;
        }
        let message = json!({ "text": text });
        channel.emit("msg", message.clone());
        let updated = with_message(store.slice("chat"), message);
        store.dispatch(Action::SetSlice { name: "chat".to_owned(), value: updated });
        draft.set(String::new());
    };

    view! {
        <section class="chat-page">
            <h1>"Chat"</h1>
            <ul class="chat-page__messages">
                {move || messages().into_iter().map(|text| view! { <li>{text}</li> }).collect_view()}
            </ul>
            <form class="chat-page__form" on:submit=on_send>
                <input
                    type="text"
                    placeholder="Say something"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button type="submit">"Send"</button>
            </form>
        </section>
    }
}
