//! Networking: HTTP service clients, the realtime channel, and the
//! connectivity probe.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Helpers` bundles the handles every route loader and component needs. It
//! is built once by the bootstrap and reaches the component tree through
//! Leptos context, so nothing here is a process-wide global.

pub mod api;
pub mod channel;
pub mod connectivity;

use std::future::Future;

use futures::future::{Either, select};

use self::api::{ApiClient, ServiceClient};
use self::channel::ChannelHandle;

/// Service handles shared by the store, route loaders, and components.
#[derive(Clone)]
pub struct Helpers {
    /// Generic JSON API client.
    pub client: ApiClient,
    /// Primary application service client (owns authentication).
    pub app: ServiceClient,
    /// Secondary REST service client.
    pub rest_app: ServiceClient,
    pub channel: ChannelHandle,
}

/// Race `fut` against `timer`. `None` means the timer won.
pub async fn with_timeout<F, T>(fut: F, timer: T) -> Option<F::Output>
where
    F: Future,
    T: Future<Output = ()>,
{
    match select(Box::pin(fut), Box::pin(timer)).await {
        Either::Left((out, _)) => Some(out),
        Either::Right(((), _)) => None,
    }
}
