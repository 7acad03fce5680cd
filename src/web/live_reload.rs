//! Live-update source fed by the cargo-leptos live-reload websocket.

use futures::StreamExt;
use futures::stream::{self, LocalBoxStream};
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;

use crate::live_update::{LiveUpdateSource, is_route_change};

pub struct LiveReloadSource {
    url: String,
}

impl LiveReloadSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl LiveUpdateSource for LiveReloadSource {
    fn changes(&self) -> LocalBoxStream<'static, ()> {
        let ws = match WebSocket::open(&self.url) {
            Ok(ws) => ws,
            Err(e) => {
                log::warn!("live reload unavailable at {}: {e}", self.url);
                return stream::empty().boxed_local();
            }
        };
        log::debug!("listening for live reload on {}", self.url);
        ws.filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => is_route_change(&text).then_some(()),
                Ok(Message::Bytes(_)) => None,
                Err(e) => {
                    log::debug!("live reload socket error: {e}");
                    None
                }
            }
        })
        .boxed_local()
    }
}
