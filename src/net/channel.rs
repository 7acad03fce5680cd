//! Realtime channel: named events over a websocket.
//!
//! `SocketChannel` keeps a handler registry and an outbox. Handlers can be
//! registered and events emitted before the socket is open; emits are
//! buffered and flushed when `open()` attaches the sender.
//!
//! The connection loop (browser only) follows the usual shape: connect,
//! pump outgoing/incoming messages until either side ends, then reconnect
//! with exponential backoff. The delay only starts over after a session that
//! actually carried traffic, so a server that accepts and immediately drops
//! the socket is not hammered. A frame the socket refused goes back to the
//! front of the outbox and is sent first on the next connection.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use events::Event;
use futures::channel::mpsc;
use serde_json::{Value, json};

/// Callback for one named event.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Bidirectional named-event channel.
pub trait RealtimeChannel: Send + Sync {
    /// Connect. Calling it again is a no-op.
    fn open(&self);
    fn is_open(&self) -> bool;
    fn emit(&self, event: &str, payload: Value);
    /// Register a handler; safe before `open()`.
    fn on(&self, event: &str, handler: EventHandler);
}

/// The session's channel, shared through `Helpers` and context.
pub type ChannelHandle = Arc<dyn RealtimeChannel>;

/// Event name to handlers.
#[derive(Default)]
pub struct EventRegistry {
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
}

impl EventRegistry {
    pub fn register(&self, event: &str, handler: EventHandler) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.entry(event.to_owned()).or_default().push(handler);
        }
    }

    /// Run every handler for `event.name`; returns how many ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        // Clone out so handlers may emit or register without deadlocking.
        let matched = self
            .handlers
            .lock()
            .ok()
            .and_then(|h| h.get(&event.name).cloned())
            .unwrap_or_default();
        for handler in &matched {
            handler(&event.data);
        }
        matched.len()
    }

    /// Decode a `["name", payload]` text message and dispatch it.
    pub fn dispatch_text(&self, text: &str) -> usize {
        match events::decode_text_event(text) {
            Ok(event) => self.dispatch(&event),
            Err(e) => {
                log::warn!("dropping malformed text event: {e}");
                0
            }
        }
    }

    /// Decode a protobuf message and dispatch it.
    pub fn dispatch_bytes(&self, bytes: &[u8]) -> usize {
        match events::decode_event(bytes) {
            Ok(event) => self.dispatch(&event),
            Err(e) => {
                log::warn!("dropping malformed binary event: {e}");
                0
            }
        }
    }
}

/// Reconnect delay bounds, in milliseconds.
pub const INITIAL_BACKOFF_MS: u32 = 1000;
pub const MAX_BACKOFF_MS: u32 = 10_000;

/// Exponential reconnect delay.
#[derive(Debug)]
pub struct Backoff {
    delay_ms: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { delay_ms: INITIAL_BACKOFF_MS }
    }
}

impl Backoff {
    /// Delay before the next attempt. `carried_traffic` says whether the
    /// session that just ended exchanged any frame.
    pub fn next_delay(&mut self, carried_traffic: bool) -> u32 {
        if carried_traffic {
            self.delay_ms = INITIAL_BACKOFF_MS;
        }
        let delay = self.delay_ms;
        self.delay_ms = delay.saturating_mul(2).min(MAX_BACKOFF_MS);
        delay
    }
}

#[derive(Default)]
struct Outbox {
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    /// Emits made before `open()`, then frames the socket failed to send.
    buffered: Vec<Vec<u8>>,
}

#[cfg(any(test, feature = "hydrate"))]
impl Outbox {
    fn requeue(&mut self, frame: Vec<u8>) {
        self.buffered.insert(0, frame);
    }

    fn take_buffered(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.buffered)
    }
}

/// Websocket-backed channel.
pub struct SocketChannel {
    url: String,
    registry: Arc<EventRegistry>,
    outbox: Arc<Mutex<Outbox>>,
    opened: AtomicBool,
}

impl SocketChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            registry: Arc::new(EventRegistry::default()),
            outbox: Arc::new(Mutex::new(Outbox::default())),
            opened: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[cfg(test)]
    fn buffered_len(&self) -> usize {
        self.outbox.lock().map_or(0, |o| o.buffered.len())
    }

    /// Create the outgoing queue, move buffered emits into it, and return
    /// the receiving end for the connection loop.
    fn attach_sender(&self) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded::<Vec<u8>>();
        if let Ok(mut outbox) = self.outbox.lock() {
            for frame in outbox.buffered.drain(..) {
                let _ = tx.unbounded_send(frame);
            }
            outbox.tx = Some(tx);
        }
        rx
    }
}

impl RealtimeChannel for SocketChannel {
    fn open(&self) {
        if self.opened.swap(true, Ordering::SeqCst) {
            return;
        }
        let rx = self.attach_sender();
        #[cfg(feature = "hydrate")]
        {
            leptos::task::spawn_local(connection_loop(
                self.url.clone(),
                self.registry.clone(),
                Arc::clone(&self.outbox),
                rx,
            ));
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("no websocket transport off-browser; {} stays offline", self.url);
            drop(rx);
        }
    }

    fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    fn emit(&self, event: &str, payload: Value) {
        let frame = events::encode_event(&Event::new(event, payload));
        let Ok(mut outbox) = self.outbox.lock() else {
            return;
        };
        match &outbox.tx {
            Some(tx) => {
                if tx.unbounded_send(frame).is_err() {
                    log::warn!("realtime channel closed; dropped {event}");
                }
            }
            None => outbox.buffered.push(frame),
        }
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.registry.register(event, handler);
    }
}

/// Register the bootstrap's two event hooks.
///
/// `news` logs and answers with `my other event`; `msg` only logs. Both are
/// placeholders for application handlers.
pub fn wire_default_handlers(channel: &ChannelHandle) {
    let weak = Arc::downgrade(channel);
    channel.on(
        "news",
        Arc::new(move |data| {
            log::info!("news: {data}");
            if let Some(channel) = weak.upgrade() {
                channel.emit("my other event", json!({ "my": "data from client" }));
            }
        }),
    );
    channel.on("msg", Arc::new(|data| log::info!("msg: {data}")));
}

/// `ws://` or `wss://` URL for `path` on the page's own host.
pub fn socket_url(page_href: &str, host: &str, path: &str) -> String {
    let proto = if page_href.starts_with("https") { "wss" } else { "ws" };
    format!("{proto}://{host}{path}")
}

#[cfg(feature = "hydrate")]
async fn connection_loop(
    url: String,
    registry: Arc<EventRegistry>,
    outbox: Arc<Mutex<Outbox>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    use std::cell::RefCell;
    use std::rc::Rc;

    let rx = Rc::new(RefCell::new(rx));
    let mut backoff = Backoff::default();

    loop {
        let carried_traffic = match connect_and_run(&url, &registry, &outbox, &rx).await {
            Ok(carried) => {
                log::info!("realtime channel disconnected");
                carried
            }
            Err(e) => {
                log::warn!("realtime channel error: {e}");
                false
            }
        };

        let delay = backoff.next_delay(carried_traffic);
        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(delay))).await;
    }
}

/// Returns whether the session exchanged any frame.
#[cfg(feature = "hydrate")]
async fn connect_and_run(
    url: &str,
    registry: &EventRegistry,
    outbox: &Mutex<Outbox>,
    rx: &std::rc::Rc<std::cell::RefCell<mpsc::UnboundedReceiver<Vec<u8>>>>,
) -> Result<bool, String> {
    use std::cell::Cell;

    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();
    log::info!("realtime channel connected to {url}");

    let carried = Cell::new(false);
    let requeue = |frame: Vec<u8>| {
        if let Ok(mut outbox) = outbox.lock() {
            outbox.requeue(frame);
        }
    };

    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        let retry = outbox.lock().map(|mut o| o.take_buffered()).unwrap_or_default();
        let mut retry = retry.into_iter();
        while let Some(frame) = retry.next() {
            if let Err(e) = ws_write.send(Message::Bytes(frame.clone())).await {
                log::warn!("realtime send failed, keeping frame: {e}");
                for rest in retry.by_ref().rev() {
                    requeue(rest);
                }
                requeue(frame);
                return;
            }
            carried.set(true);
        }
        while let Some(frame) = rx_borrow.next().await {
            if let Err(e) = ws_write.send(Message::Bytes(frame.clone())).await {
                log::warn!("realtime send failed, keeping frame: {e}");
                requeue(frame);
                return;
            }
            carried.set(true);
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Bytes(bytes)) => {
                    carried.set(true);
                    registry.dispatch_bytes(&bytes);
                }
                Ok(Message::Text(text)) => {
                    carried.set(true);
                    registry.dispatch_text(&text);
                }
                Err(e) => {
                    log::warn!("realtime recv error: {e}");
                    break;
                }
            }
        }
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
    Ok(carried.get())
}
