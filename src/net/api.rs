//! HTTP API clients.
//!
//! `ApiClient` is the generic JSON client; `ServiceClient` adds an
//! authenticated session on top of it. Both go through a [`Transport`] so the
//! request/response logic runs the same in the browser (`gloo-net`) and in
//! tests.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. Callers at startup treat
//! failures as "continue without the data", never as fatal.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, Mutex};

use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::persist::StateStorage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one HTTP request.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<ApiResponse, ApiError>>;
}

/// Join `base` and `path` with exactly one slash between them.
pub fn format_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Generic JSON client rooted at an API base path.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base: String,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base: impl Into<String>) -> Self {
        Self { transport, base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::Get, path, None, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        self.request(Method::Post, path, Some(body), None).await
    }

    /// Send a request and decode a JSON body.
    ///
    /// An empty body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives,
    /// [`ApiError::Status`] on a non-2xx status, and [`ApiError::Decode`]
    /// when the body does not fit `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        bearer: Option<String>,
    ) -> Result<T, ApiError> {
        let request = ApiRequest { method, url: format_url(&self.base, path), body, bearer };
        let response = self.transport.send(request).await?;
        if !response.ok() {
            return Err(ApiError::Status(response.status));
        }
        let raw = if response.body.trim().is_empty() { "null" } else { response.body.as_str() };
        serde_json::from_str(raw).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Which service endpoint a [`ServiceClient`] talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceKind {
    Primary,
    Rest,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub user: Value,
}

/// Application service client holding an optional authenticated session.
#[derive(Clone)]
pub struct ServiceClient {
    kind: ServiceKind,
    api: ApiClient,
    storage: Arc<dyn StateStorage>,
    token_key: String,
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl ServiceClient {
    pub fn new(kind: ServiceKind, api: ApiClient, storage: Arc<dyn StateStorage>, token_key: impl Into<String>) -> Self {
        Self { kind, api, storage, token_key: token_key.into(), session: Arc::new(Mutex::new(None)) }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    /// Re-authenticate with the access token left in storage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when no token is stored, and any
    /// [`ApiError`] the authentication request produces.
    pub async fn authenticate(&self) -> Result<AuthSession, ApiError> {
        let token = self
            .storage
            .get_item(&self.token_key)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let payload = serde_json::json!({ "strategy": "jwt", "accessToken": token });
        let session: AuthSession = self.api.post("/authentication", payload).await?;

        if let Err(e) = self.storage.set_item(&self.token_key, &session.access_token) {
            log::warn!("could not store refreshed token: {e}");
        }
        if let Ok(mut slot) = self.session.lock() {
            *slot = Some(session.clone());
        }
        log::debug!("{:?} service authenticated", self.kind);
        Ok(session)
    }

    /// Store `token` and authenticate with it.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceClient::authenticate`].
    pub async fn sign_in(&self, token: &str) -> Result<AuthSession, ApiError> {
        self.storage
            .set_item(&self.token_key, token)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        self.authenticate().await
    }

    /// Forget the session and the stored token.
    pub fn logout(&self) {
        if let Ok(mut slot) = self.session.lock() {
            *slot = None;
        }
        let _ = self.storage.remove_item(&self.token_key);
    }

    /// Call a service method with the session's bearer token, if any.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, ApiError> {
        let bearer = self.session().map(|s| s.access_token);
        self.api.request(method, path, body, bearer).await
    }
}
