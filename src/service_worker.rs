//! Service worker registration for offline support in production.
//!
//! Registration is attempted only when the page is online, the build is not
//! a development build, and the browser supports service workers. It runs
//! after the window `load` event, is never retried, and its failure never
//! leaves the load handler.

#[cfg(test)]
#[path = "service_worker_test.rs"]
mod service_worker_test;

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::{BootConfig, BuildMode};
use crate::error::ServiceWorkerError;

/// Browser service-worker capability.
pub trait ServiceWorkerHost {
    fn is_supported(&self) -> bool;

    fn register<'a>(&'a self, script: &'a str, scope: &'a str) -> LocalBoxFuture<'a, Result<(), ServiceWorkerError>>;

    /// Resolves once an active worker controls the scope.
    fn ready(&self) -> LocalBoxFuture<'_, ()>;

    /// Run `task` when the window `load` event fires.
    fn on_page_load(&self, task: LocalBoxFuture<'static, ()>);
}

pub fn should_register(online: bool, mode: BuildMode, supported: bool) -> bool {
    online && !mode.is_development() && supported
}

/// Body of the `load` handler.
pub async fn registration_task(host: &dyn ServiceWorkerHost, script: &str, scope: &str) {
    if let Err(e) = host.register(script, scope).await {
        log::warn!("error registering service worker: {e}");
        return;
    }
    log::info!("service worker registered");
    host.ready().await;
    log::info!("service worker ready");
}

/// Attach registration to page load if the conditions hold. Returns whether
/// a handler was attached.
pub fn schedule_registration(host: &Rc<dyn ServiceWorkerHost>, online: bool, config: &BootConfig) -> bool {
    if !should_register(online, config.mode, host.is_supported()) {
        log::debug!("service worker registration skipped");
        return false;
    }
    let task_host = Rc::clone(host);
    let script = config.service_worker_path.clone();
    let scope = config.service_worker_scope.clone();
    host.on_page_load(Box::pin(async move {
        registration_task(task_host.as_ref(), &script, &scope).await;
    }));
    true
}
