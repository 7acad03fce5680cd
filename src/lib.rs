//! # boilerplate-client
//!
//! Client bootstrap for a server-rendered Leptos application. On page load
//! it decides whether the network is reachable, rebuilds the store from
//! server-injected or persisted state, opens the realtime channel, hydrates
//! the server markup, and (in production) registers a service worker for
//! offline use.
//!
//! The sequence itself (`boot::run`) is generic over small traits for every
//! browser capability, so it runs natively under test; `web` supplies the
//! browser implementations behind the `hydrate` feature.

pub mod app;
pub mod boot;
pub mod components;
pub mod config;
pub mod connect;
pub mod error;
pub mod hydration;
pub mod live_update;
pub mod net;
pub mod pages;
pub mod routes;
pub mod service_worker;
pub mod state;
#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
mod test_support;

/// WASM entry point.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();

    let config = config::BootConfig::from_build_env();
    let level = if config.mode.is_production() { log::Level::Info } else { log::Level::Debug };
    _ = console_log::init_with_level(level);
    leptos::task::Executor::init_wasm_bindgen().ok();

    leptos::task::spawn_local(async move {
        let platform = web::WebPlatform::new(&config);
        match boot::run(&platform, &config).await {
            Ok(session) => log::debug!("session store {:?}", session.store.id()),
            Err(e) => log::error!("bootstrap failed, page stays static: {e}"),
        }
    });
}
