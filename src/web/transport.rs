//! `gloo-net` HTTP transport.

use futures::future::LocalBoxFuture;
use gloo_net::http::{Request, RequestBuilder};

use crate::error::ApiError;
use crate::net::api::{ApiRequest, ApiResponse, Method, Transport};

/// Sends requests with the browser's `fetch`.
pub struct GlooTransport;

fn builder(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Put => Request::put(url),
        Method::Patch => Request::patch(url),
        Method::Delete => Request::delete(url),
    }
}

impl Transport for GlooTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            let mut builder = builder(request.method, &request.url).header("Accept", "application/json");
            if let Some(token) = &request.bearer {
                builder = builder.header("Authorization", &format!("Bearer {token}"));
            }
            let prepared = match &request.body {
                Some(body) => builder.json(body),
                None => builder.build(),
            }
            .map_err(|e| ApiError::Transport(e.to_string()))?;

            let response = prepared.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
            let status = response.status();
            let body = response.text().await.map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok(ApiResponse { status, body })
        })
    }
}
