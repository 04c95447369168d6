//! HTTP client for the move catalog.
//!
//! # Responsibilities
//! - Build the upstream URL for a resource
//! - Forward the caller's `Authorization` header unchanged
//! - Enforce connect and request timeouts
//! - Fold every failure into `UpstreamError`

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::types::{Resource, UpstreamError};

/// Thin wrapper over a shared `reqwest::Client` bound to one base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout_ms: u64,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut base_url =
            Url::parse(&config.base_url).map_err(|e| UpstreamError::Request(e.to_string()))?;
        // Url::join drops the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            request_timeout_ms: config.request_timeout_ms,
        })
    }

    /// Full URL for a resource.
    pub fn url_for(&self, resource: Resource) -> Result<Url, UpstreamError> {
        self.base_url
            .join(&resource.path())
            .map_err(|e| UpstreamError::Request(e.to_string()))
    }

    /// Perform one round trip and return the body text on a 2xx response.
    pub async fn call(
        &self,
        resource: Resource,
        authorization: Option<&HeaderValue>,
    ) -> Result<String, UpstreamError> {
        let url = self.url_for(resource)?;

        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = authorization {
            request = request.header(AUTHORIZATION, auth.clone());
        }

        let result = self.send(request).await;
        metrics::record_upstream_attempt(result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(resource = %resource, error = %e, "Upstream attempt failed");
        }
        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.request_timeout_ms)
            } else {
                UpstreamError::Body(e.to_string())
            }
        })
    }

    fn classify(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.request_timeout_ms)
        } else if e.is_builder() {
            UpstreamError::Request(e.to_string())
        } else {
            UpstreamError::Connect(e.to_string())
        }
    }
}
