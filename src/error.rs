//! Error types for the bootstrap sequence and its collaborators.
//!
//! ERROR HANDLING
//! ==============
//! Only [`BootError`] escapes `boot::run`; it is fatal and leaves the page
//! with its static server markup. Every other error here is caught at the
//! step that produced it, logged, and turned into a fallback.

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// The merged initial state could not seed a store.
    #[error("store construction failed: {0}")]
    StoreConstruction(String),
    /// No element with the configured id exists in the document.
    #[error("mount point #{0} not found")]
    MountPointMissing(String),
    /// The renderer could not attach the component tree.
    #[error("render failed: {0}")]
    Render(String),
}

/// Failures talking to the HTTP API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("request failed with status {0}")]
    Status(u16),
    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// No stored credentials to authenticate with.
    #[error("no stored credentials")]
    Unauthenticated,
    /// The request did not complete within its deadline.
    #[error("request timed out")]
    Timeout,
}

/// Failures reading or writing persisted state slices.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage backend cannot be reached (e.g. disabled by the browser).
    #[error("storage unavailable")]
    Unavailable,
    /// A read failed.
    #[error("storage read failed: {0}")]
    Read(String),
    /// A write failed.
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Failures resolving the current location against the route table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Nothing in the table matches the location.
    #[error("no route matches {0}")]
    NoMatch(String),
    /// Guards kept redirecting past the hop limit.
    #[error("redirect loop starting at {0}")]
    RedirectLoop(String),
}

/// Failures registering the service worker.
#[derive(Debug, thiserror::Error)]
pub enum ServiceWorkerError {
    /// The browser rejected the registration.
    #[error("registration failed: {0}")]
    Register(String),
}
