//! Transport seam
//!
//! The recovery protocol in `ApiClient` only needs "send this request,
//! give me a status and a body, or a network error". Keeping that behind a
//! trait lets the protocol be exercised without a server.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::request::{ApiRequest, ApiResponse, Method};
use crate::{HttpError, Result};

/// Marker header the backend uses to distinguish first-party clients.
pub const CLIENT_HEADER: &str = "wealth-warden-client";

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. `Err` is reserved for failures with no response
    /// (network unreachable); HTTP error statuses come back as `Ok`.
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(5))
            .timeout(timeout)
            .cookie_store(true)
            .user_agent("WealthWarden Client")
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&req.path)?;

        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url)
            .header(CLIENT_HEADER, "true");

        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(&bytes).ok()
        };

        Ok(ApiResponse { status, body })
    }
}
