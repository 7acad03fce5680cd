//! Browser implementations of the bootstrap seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only compiled with the `hydrate` feature. Each type here implements one
//! trait the bootstrap is generic over; `WebPlatform` hands them out.

mod live_reload;
mod render;
mod service_worker;
mod storage;
mod transport;

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use wasm_bindgen::JsValue;

pub use self::live_reload::LiveReloadSource;
pub use self::render::WebRenderHost;
pub use self::service_worker::WebServiceWorker;
pub use self::storage::LocalStorage;
pub use self::transport::GlooTransport;
use crate::boot::Platform;
use crate::config::BootConfig;
use crate::hydration::RenderHost;
use crate::live_update::{LiveUpdateSource, live_reload_url};
use crate::net::api::Transport;
use crate::net::channel::{ChannelHandle, SocketChannel, socket_url};
use crate::net::connectivity::probe_online;
use crate::service_worker::ServiceWorkerHost;
use crate::state::history::full_location;
use crate::state::persist::{MemoryStorage, StateStorage};
use crate::state::tree::StateTree;

/// Global the server serializes initial state into.
const INJECTED_STATE_GLOBAL: &str = "__data";

pub struct WebPlatform {
    host: Rc<WebRenderHost>,
}

impl WebPlatform {
    pub fn new(config: &BootConfig) -> Self {
        Self { host: Rc::new(WebRenderHost::new(config.mount_id.clone())) }
    }
}

impl Platform for WebPlatform {
    fn injected_state(&self) -> Option<StateTree> {
        let window = web_sys::window()?;
        let data = js_sys::Reflect::get(&window, &JsValue::from_str(INJECTED_STATE_GLOBAL)).ok()?;
        if data.is_undefined() || data.is_null() {
            return None;
        }
        let raw = js_sys::JSON::stringify(&data).ok().map(String::from)?;
        StateTree::from_json(&raw)
    }

    fn probe<'a>(&'a self, config: &'a BootConfig) -> LocalBoxFuture<'a, bool> {
        Box::pin(probe_online(&config.probe_url, config.probe_timeout))
    }

    fn location(&self) -> String {
        web_sys::window()
            .and_then(|w| {
                let loc = w.location();
                Some(full_location(&loc.pathname().ok()?, &loc.search().ok()?, &loc.hash().ok()?))
            })
            .unwrap_or_else(|| "/".to_owned())
    }

    fn storage(&self) -> Arc<dyn StateStorage> {
        if LocalStorage::available() {
            Arc::new(LocalStorage)
        } else {
            log::warn!("localStorage unavailable; persisted state lasts for this page only");
            Arc::new(MemoryStorage::new())
        }
    }

    fn transport(&self) -> Arc<dyn Transport> {
        Arc::new(GlooTransport)
    }

    fn channel(&self, config: &BootConfig) -> ChannelHandle {
        let (href, host) = web_sys::window()
            .map(|w| {
                let loc = w.location();
                (loc.href().unwrap_or_default(), loc.host().unwrap_or_default())
            })
            .unwrap_or_default();
        Arc::new(SocketChannel::new(socket_url(&href, &host, &config.socket_path)))
    }

    fn render_host(&self) -> Rc<dyn RenderHost> {
        self.host.clone()
    }

    fn service_worker(&self) -> Option<Rc<dyn ServiceWorkerHost>> {
        Some(Rc::new(WebServiceWorker))
    }

    fn live_updates(&self, config: &BootConfig) -> Option<Box<dyn LiveUpdateSource>> {
        let hostname = web_sys::window()?.location().hostname().ok()?;
        Some(Box::new(LiveReloadSource::new(live_reload_url(&hostname, config.reload_port))))
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
