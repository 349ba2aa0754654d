//! Upstream JSON fetching.
//!
//! Every pipeline talks to its upstream through the [`Fetcher`] trait, so the
//! aggregation and normalization logic can run against canned payloads in tests.

pub mod headers;

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub use headers::{stock_headers, weather_headers};

/// A named remote resource relative to a fetcher's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Identifier reported in errors and logs.
    pub name: String,
    /// Path and query appended to the base URL.
    pub path: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Source of parsed JSON documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one endpoint and parse the full body as JSON.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

/// reqwest-backed fetcher with a fixed header set.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Build a fetcher for `base_url`.
    ///
    /// `timeout` of `None` leaves the transport default in place.
    pub fn new(
        base_url: impl Into<String>,
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    /// Full URL for an endpoint.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.path)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let url = self.url_for(endpoint);
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            endpoint: endpoint.name.clone(),
            message: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                error_chain(&e)
            },
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;

        // The upstream sometimes reports errors with a JSON body, so the body is
        // parsed regardless of status.
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered with status {}", endpoint.name, status);
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("{}: received {} bytes", endpoint.name, body.len());

        let text = String::from_utf8_lossy(&body);
        serde_json::from_str(&text).map_err(|source| FetchError::Parse {
            endpoint: endpoint.name.clone(),
            source,
        })
    }
}

/// `err` followed by each of its causes, separated by `: `.
///
/// reqwest's own message only names the URL; the connect, DNS or TLS failure
/// sits further down the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
