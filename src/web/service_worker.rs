//! `navigator.serviceWorker` binding.

use futures::future::LocalBoxFuture;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::ServiceWorkerError;
use crate::service_worker::ServiceWorkerHost;

pub struct WebServiceWorker;

fn container() -> Option<web_sys::ServiceWorkerContainer> {
    web_sys::window().map(|w| w.navigator().service_worker())
}

impl ServiceWorkerHost for WebServiceWorker {
    fn is_supported(&self) -> bool {
        web_sys::window()
            .and_then(|w| js_sys::Reflect::has(&w.navigator(), &JsValue::from_str("serviceWorker")).ok())
            .unwrap_or(false)
    }

    fn register<'a>(&'a self, script: &'a str, scope: &'a str) -> LocalBoxFuture<'a, Result<(), ServiceWorkerError>> {
        Box::pin(async move {
            let container = container().ok_or_else(|| ServiceWorkerError::Register("no navigator".to_owned()))?;
            let options = web_sys::RegistrationOptions::new();
            options.set_scope(scope);
            JsFuture::from(container.register_with_options(script, &options))
                .await
                .map_err(|e| ServiceWorkerError::Register(format!("{e:?}")))?;
            Ok(())
        })
    }

    fn ready(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            let Some(promise) = container().and_then(|c| c.ready().ok()) else {
                return;
            };
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("service worker never became ready: {e:?}");
            }
        })
    }

    fn on_page_load(&self, task: LocalBoxFuture<'static, ()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let loaded = window
            .document()
            .is_some_and(|d| d.ready_state() == "complete");
        if loaded {
            leptos::task::spawn_local(task);
            return;
        }
        let handler = Closure::once_into_js(move || leptos::task::spawn_local(task));
        if let Err(e) = window.add_event_listener_with_callback("load", handler.unchecked_ref()) {
            log::warn!("could not attach load handler: {e:?}");
        }
    }
}
