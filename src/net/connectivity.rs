//! Connectivity check run once at startup.
//!
//! A server-rendered page that arrived with injected state proves the
//! network worked a moment ago, so no probe is needed. Otherwise the browser
//! probe asks `navigator.onLine`, then fetches a tiny resource with a
//! cache-busting query. Errors and timeouts both mean offline.

#[cfg(test)]
#[path = "connectivity_test.rs"]
mod connectivity_test;

use std::future::Future;

/// Decide connectivity, probing only when no injected state is present.
pub async fn resolve_connectivity<F, Fut>(injected_present: bool, probe: F) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = bool>,
{
    if injected_present {
        return true;
    }
    probe().await
}

/// Append a cache-busting query parameter to `url`.
pub fn cache_busted_url(url: &str, stamp: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}_={stamp}")
}

/// Actively probe reachability from the browser.
#[cfg(feature = "hydrate")]
pub async fn probe_online(url: &str, timeout: std::time::Duration) -> bool {
    let navigator_online = web_sys::window().is_some_and(|w| w.navigator().on_line());
    if !navigator_online {
        return false;
    }

    // Truncation is fine; the stamp only has to differ between loads.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let stamp = js_sys::Date::now() as u64;
    let request = gloo_net::http::Request::get(&cache_busted_url(url, stamp)).send();
    let timer = gloo_timers::future::sleep(timeout);

    match super::with_timeout(request, timer).await {
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            log::debug!("connectivity probe failed: {e}");
            false
        }
        None => {
            log::debug!("connectivity probe timed out");
            false
        }
    }
}
