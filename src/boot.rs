//! Bootstrap sequence: from a server-rendered page to a hydrated, connected
//! application.
//!
//! SYSTEM CONTEXT
//! ==============
//! `run` executes once per page load inside a single local task. Every step
//! is awaited in order:
//!
//! 1. read server-injected state and the persisted snapshot
//! 2. resolve connectivity
//! 3. create the realtime channel and register its handlers
//! 4. when online: open the channel, then try to re-authenticate
//! 5. merge the initial state and build the store
//! 6. render (hydrate) the routes for the current location
//! 7. development diagnostics and the live-update hook
//! 8. schedule service-worker registration
//!
//! Only the service-worker handler, deferred route loads, the channel's
//! connection loop, and the live-update listener outlive `run`.
//!
//! ERROR HANDLING
//! ==============
//! A failed store construction or render is returned as [`BootError`] and
//! ends the sequence. Authentication failures, probe failures, and
//! registration failures are logged and absorbed.

#[cfg(test)]
#[path = "boot_test.rs"]
mod boot_test;

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use serde_json::{Value, json};

use crate::config::BootConfig;
use crate::error::{ApiError, BootError};
use crate::hydration::{RenderHost, dev_checks, render};
use crate::live_update::{LiveUpdateSource, watch};
use crate::net::api::{ApiClient, ServiceClient, ServiceKind, Transport};
use crate::net::channel::{ChannelHandle, wire_default_handlers};
use crate::net::connectivity::resolve_connectivity;
use crate::net::{Helpers, with_timeout};
use crate::routes::route_table;
use crate::service_worker::{ServiceWorkerHost, schedule_registration};
use crate::state::history::{SyncedHistory, sync_history_with_store};
use crate::state::merge::merge_initial_state;
use crate::state::persist::{StateStorage, load_stored_state};
use crate::state::store::Persistor;
use crate::state::tree::StateTree;
use crate::state::{Action, Store, create_store};

/// The environment the bootstrap runs in.
pub trait Platform {
    /// State the server serialized into the page, if any.
    fn injected_state(&self) -> Option<StateTree>;

    /// Active reachability check.
    fn probe<'a>(&'a self, config: &'a BootConfig) -> LocalBoxFuture<'a, bool>;

    /// Current browser location (path, query, and fragment).
    fn location(&self) -> String;

    fn storage(&self) -> Arc<dyn StateStorage>;

    fn transport(&self) -> Arc<dyn Transport>;

    /// A fresh, unopened realtime channel.
    fn channel(&self, config: &BootConfig) -> ChannelHandle;

    fn render_host(&self) -> Rc<dyn RenderHost>;

    fn service_worker(&self) -> Option<Rc<dyn ServiceWorkerHost>>;

    fn live_updates(&self, config: &BootConfig) -> Option<Box<dyn LiveUpdateSource>>;

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// What a finished bootstrap leaves behind.
#[derive(Clone, Debug)]
pub struct Session {
    pub store: Store,
    pub history: SyncedHistory,
    pub online: bool,
    /// A live-update listener was started.
    pub live_update: bool,
    /// A service-worker registration handler was attached.
    pub service_worker: bool,
}

/// Bundle the service handles every loader and component uses.
pub fn build_helpers(
    transport: Arc<dyn Transport>,
    storage: Arc<dyn StateStorage>,
    channel: ChannelHandle,
    config: &BootConfig,
) -> Helpers {
    let api = ApiClient::new(Arc::clone(&transport), config.api_base.clone());
    let rest = ApiClient::new(transport, config.rest_api_base.clone());
    Helpers {
        client: api.clone(),
        app: ServiceClient::new(ServiceKind::Primary, api, Arc::clone(&storage), config.token_key.clone()),
        rest_app: ServiceClient::new(ServiceKind::Rest, rest, storage, config.token_key.clone()),
        channel,
    }
}

/// Run the bootstrap sequence.
///
/// # Errors
///
/// Returns [`BootError`] if the store cannot be built or the tree cannot be
/// attached to the mount point.
pub async fn run<P: Platform + ?Sized>(platform: &P, config: &BootConfig) -> Result<Session, BootError> {
    let injected = platform.injected_state();
    let storage = platform.storage();
    let stored = load_stored_state(storage.as_ref(), &config.persist);

    let online = resolve_connectivity(injected.is_some(), || platform.probe(config)).await;
    log::info!("starting {}, injected state: {}", if online { "online" } else { "offline" }, injected.is_some());

    let channel = platform.channel(config);
    wire_default_handlers(&channel);
    let helpers = build_helpers(platform.transport(), Arc::clone(&storage), Arc::clone(&channel), config);

    let mut session_user: Option<Value> = None;
    if online {
        channel.open();
        let auth = with_timeout(helpers.app.authenticate(), platform.sleep(config.auth_timeout)).await;
        match auth.unwrap_or(Err(ApiError::Timeout)) {
            Ok(session) => session_user = Some(session.user),
            Err(ApiError::Timeout) => log::warn!("authentication timed out after {:?}", config.auth_timeout),
            Err(e) => log::info!("continuing unauthenticated: {e}"),
        }
    }

    let initial = merge_initial_state(online, stored, injected.as_ref());
    let persistor = Persistor { config: config.persist.clone(), storage };
    let store = create_store(platform.location(), helpers, initial, Some(persistor))?;
    if let Some(user) = session_user {
        if store.state().auth_user().is_none() {
            store.dispatch(Action::SetSlice { name: "auth".to_owned(), value: json!({ "user": user }) });
        }
    }
    let history = sync_history_with_store(&store);

    let host = platform.render_host();
    render(host.as_ref(), &route_table(&store), &store).await?;
    dev_checks(host.as_ref(), config, &store);

    let live_update = config.mode.is_development() && start_live_update(platform, config, &host, &store);

    let service_worker = platform
        .service_worker()
        .is_some_and(|sw| schedule_registration(&sw, online, config));

    log::info!("bootstrap complete for {}", history.location());
    Ok(Session { store, history, online, live_update, service_worker })
}

fn start_live_update<P: Platform + ?Sized>(
    platform: &P,
    config: &BootConfig,
    host: &Rc<dyn RenderHost>,
    store: &Store,
) -> bool {
    let Some(source) = platform.live_updates(config) else {
        return false;
    };
    let changes = source.changes();
    let task_host = Rc::clone(host);
    let task_store = store.clone();
    host.spawn(Box::pin(async move {
        let renders = watch(changes, task_host.as_ref(), &task_store).await;
        log::debug!("live-update source closed after {renders} re-renders");
    }));
    true
}
