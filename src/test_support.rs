//! In-memory stand-ins for the browser seams, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::error::{ApiError, BootError, ServiceWorkerError};
use crate::hydration::{MountRequest, RenderHost};
use crate::net::Helpers;
use crate::net::api::{ApiClient, ApiRequest, ApiResponse, ServiceClient, ServiceKind, Transport};
use crate::net::channel::{ChannelHandle, EventHandler, EventRegistry, RealtimeChannel};
use crate::service_worker::ServiceWorkerHost;
use crate::state::Store;
use crate::state::persist::{MemoryStorage, StateStorage};

/// Transport answering from a queue of canned responses, recording requests.
#[derive(Default)]
pub struct FakeTransport {
    pub responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .expect("lock")
            .push_back(Ok(ApiResponse { status, body: body.to_owned() }));
    }

    pub fn fail(&self, error: ApiError) {
        self.responses.lock().expect("lock").push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<ApiResponse, ApiError>> {
        self.requests.lock().expect("lock").push(request);
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse { status: 404, body: String::new() }));
        Box::pin(async move { next })
    }
}

/// Channel recording opens and emits; incoming events are fed by `deliver`.
#[derive(Default)]
pub struct FakeChannel {
    pub opens: AtomicUsize,
    open: AtomicBool,
    pub emitted: Mutex<Vec<(String, Value)>>,
    registry: EventRegistry,
    pub registered: Mutex<HashMap<String, usize>>,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn deliver(&self, event: &str, payload: Value) -> usize {
        self.registry.dispatch(&events::Event::new(event, payload))
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().expect("lock").clone()
    }
}

impl RealtimeChannel for FakeChannel {
    fn open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn emit(&self, event: &str, payload: Value) {
        self.emitted.lock().expect("lock").push((event.to_owned(), payload));
    }

    fn on(&self, event: &str, handler: EventHandler) {
        *self.registered.lock().expect("lock").entry(event.to_owned()).or_default() += 1;
        self.registry.register(event, handler);
    }
}

/// Helpers wired to the given fakes.
pub fn helpers_with(transport: Arc<FakeTransport>, storage: Arc<MemoryStorage>, channel: ChannelHandle) -> Helpers {
    let api = ApiClient::new(transport, "/api");
    let storage: Arc<dyn StateStorage> = storage;
    Helpers {
        client: api.clone(),
        app: ServiceClient::new(ServiceKind::Primary, api.clone(), storage.clone(), "auth-token"),
        rest_app: ServiceClient::new(ServiceKind::Rest, api, storage, "auth-token"),
        channel,
    }
}

/// Helpers backed by fresh fakes.
pub fn helpers() -> Helpers {
    helpers_with(Arc::new(FakeTransport::new()), Arc::new(MemoryStorage::new()), FakeChannel::new())
}

/// Render host recording mounts and queuing spawned tasks.
#[derive(Default)]
pub struct FakeRenderHost {
    pub mounts: RefCell<Vec<MountRequest>>,
    pub fail_hydrate: Cell<bool>,
    pub server_markup: Cell<bool>,
    pub extension: Cell<bool>,
    pub devtools_mounts: RefCell<Vec<Store>>,
    pub marker_checks: Cell<usize>,
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl FakeRenderHost {
    pub fn new() -> Rc<Self> {
        let host = Self::default();
        host.server_markup.set(true);
        Rc::new(host)
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.borrow().len()
    }

    /// Route name of the most recent mount, `None` for an error mount.
    pub fn last_route(&self) -> Option<&'static str> {
        self.mounts.borrow().last().and_then(|m| m.route.as_ref().ok().map(|props| props.entry.name))
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Drive every spawned task to completion, including ones they spawn.
    pub fn run_spawned(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                return ran;
            }
            for task in batch {
                block_on(task);
                ran += 1;
            }
        }
    }
}

impl RenderHost for FakeRenderHost {
    fn hydrate(&self, request: MountRequest) -> Result<(), BootError> {
        if self.fail_hydrate.get() {
            return Err(BootError::MountPointMissing("content".to_owned()));
        }
        self.mounts.borrow_mut().push(request);
        Ok(())
    }

    fn has_server_markup(&self, _marker: &str) -> bool {
        self.marker_checks.set(self.marker_checks.get() + 1);
        self.server_markup.get()
    }

    fn devtools_extension_present(&self) -> bool {
        self.extension.get()
    }

    fn mount_devtools(&self, store: &Store) -> Result<(), BootError> {
        self.devtools_mounts.borrow_mut().push(store.clone());
        Ok(())
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

/// Service-worker capability recording registrations; `load` is fired by
/// the test.
#[derive(Default)]
pub struct FakeServiceWorker {
    pub supported: bool,
    pub reject: Option<String>,
    pub registrations: RefCell<Vec<(String, String)>>,
    pub ready_awaited: Cell<bool>,
    load_handlers: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl FakeServiceWorker {
    pub fn supported() -> Self {
        Self { supported: true, ..Self::default() }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self { supported: true, reject: Some(reason.to_owned()), ..Self::default() }
    }

    pub fn load_handler_count(&self) -> usize {
        self.load_handlers.borrow().len()
    }

    pub fn fire_load(&self) {
        let handlers: Vec<_> = self.load_handlers.borrow_mut().drain(..).collect();
        for handler in handlers {
            block_on(handler);
        }
    }
}

impl ServiceWorkerHost for FakeServiceWorker {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn register<'a>(&'a self, script: &'a str, scope: &'a str) -> LocalBoxFuture<'a, Result<(), ServiceWorkerError>> {
        self.registrations.borrow_mut().push((script.to_owned(), scope.to_owned()));
        let result = match &self.reject {
            Some(reason) => Err(ServiceWorkerError::Register(reason.clone())),
            None => Ok(()),
        };
        Box::pin(async move { result })
    }

    fn ready(&self) -> LocalBoxFuture<'_, ()> {
        self.ready_awaited.set(true);
        Box::pin(async {})
    }

    fn on_page_load(&self, task: LocalBoxFuture<'static, ()>) {
        self.load_handlers.borrow_mut().push(task);
    }
}
