//! State-provider boundary.

use leptos::prelude::*;

use crate::state::Store;

/// Expose the store, the service helpers, and the realtime channel to every
/// descendant through context.
#[component]
pub fn Provider(store: Store, children: Children) -> impl IntoView {
    let helpers = store.helpers().clone();
    provide_context(helpers.channel.clone());
    provide_context(helpers);
    provide_context(store);
    children()
}
