//! Hydration renderer: resolves the current location to a route, prefetches
//! its blocking data, and attaches the application tree to the server
//! markup.
//!
//! SYSTEM CONTEXT
//! ==============
//! `render` is called once by the bootstrap and again by the live-update
//! hook, always with the same `Store`. Everything browser-specific sits
//! behind [`RenderHost`]; the `web` module provides the real one.
//!
//! DESIGN
//! ======
//! Guard redirects are applied before the first render by dispatching a
//! `Replace` and re-matching, bounded at [`MAX_REDIRECTS`] hops. A match
//! error is logged and still rendered; the outlet shows an error view
//! instead of a page. An offline store never waits on route data: every
//! item is started after mount.

#[cfg(test)]
#[path = "hydration_test.rs"]
mod hydration_test;

use futures::future::LocalBoxFuture;

use crate::config::BootConfig;
use crate::connect::{ConnectContext, blocking_items, deferred_items, load_items};
use crate::error::{BootError, RouteError};
use crate::routes::{MatchOutcome, RenderProps, RouteTable, match_routes};
use crate::state::{Action, Store};

/// Redirect hops followed before giving up with [`RouteError::RedirectLoop`].
pub const MAX_REDIRECTS: usize = 5;

/// Everything needed to build the application tree.
#[derive(Clone, Debug)]
pub struct MountRequest {
    pub store: Store,
    pub routes: RouteTable,
    /// The route resolved for the first frame, or why none was.
    pub route: Result<RenderProps, RouteError>,
}

/// Browser side of rendering.
pub trait RenderHost {
    /// Attach the tree to the mount point. The first call hydrates the
    /// server markup; later calls replace the previous tree.
    fn hydrate(&self, request: MountRequest) -> Result<(), BootError>;

    /// Whether the mount point's first element carries `marker`.
    fn has_server_markup(&self, marker: &str) -> bool;

    /// Whether a browser dev-tools extension is installed.
    fn devtools_extension_present(&self) -> bool;

    /// Mount the standalone dev-tools tree into a fresh element.
    fn mount_devtools(&self, store: &Store) -> Result<(), BootError>;

    /// Run `task` detached on the page's executor.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Match the store's location, following guard redirects.
pub fn resolve_route(routes: &RouteTable, store: &Store) -> Result<RenderProps, RouteError> {
    let start = store.location();
    let mut hops = 0;
    loop {
        let location = store.location();
        match match_routes(routes, &location) {
            MatchOutcome::Matched(props) => return Ok(props),
            MatchOutcome::Error(e) => return Err(e),
            MatchOutcome::Redirect(target) if hops < MAX_REDIRECTS => {
                log::info!("redirecting {location} -> {target} before first render");
                store.dispatch(Action::Replace { path: target });
                hops += 1;
            }
            MatchOutcome::Redirect(_) => return Err(RouteError::RedirectLoop(start)),
        }
    }
}

/// Render the application for the store's current location.
///
/// # Errors
///
/// Only a failure to attach the tree is returned; data and route errors are
/// logged and rendered around.
pub async fn render<H: RenderHost + ?Sized>(host: &H, routes: &RouteTable, store: &Store) -> Result<(), BootError> {
    let route = resolve_route(routes, store);

    let deferred = match &route {
        Ok(props) => {
            let ctx = ConnectContext::new(store, props.params.clone());
            // Offline, nothing may hold the first frame on the network.
            let (now, later) = if store.is_online() {
                (blocking_items(props), deferred_items(props))
            } else {
                (Vec::new(), props.entry.items.clone())
            };
            let loaded = load_items(&now, &ctx).await;
            log::debug!("route {} ready, loaded {loaded:?}", props.entry.name);
            Some((later, ctx))
        }
        Err(e) => {
            log::error!("route match failed: {e}");
            None
        }
    };

    host.hydrate(MountRequest { store: store.clone(), routes: routes.clone(), route })?;

    if let Some((items, ctx)) = deferred.filter(|(items, _)| !items.is_empty()) {
        host.spawn(Box::pin(async move {
            let loaded = load_items(&items, &ctx).await;
            log::debug!("deferred route data loaded: {loaded:?}");
        }));
    }
    Ok(())
}

/// Development diagnostics run once after the first render: the server
/// markup check and the in-page dev tools.
pub fn dev_checks<H: RenderHost + ?Sized>(host: &H, config: &BootConfig, store: &Store) {
    if config.mode.is_production() {
        return;
    }

    if !host.has_server_markup(&config.ssr_marker) {
        log::error!(
            "server-side render was discarded; make sure the initial render does not contain any client-side code"
        );
    }

    if config.devtools_enabled() && !host.devtools_extension_present() {
        match host.mount_devtools(store) {
            Ok(()) => log::debug!("dev tools mounted"),
            Err(e) => log::warn!("dev tools not mounted: {e}"),
        }
    }
}
