//! Page fetcher implementations
//!
//! This module handles every download the harvester makes:
//! - Building the HTTP client from configuration
//! - GET requests that follow redirects transparently
//! - Folding transport errors into `FetchResult::Failed` so they never
//!   propagate past the point of use
//! - An in-memory fetcher for offline runs and tests

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered with a body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: Vec<u8>,
    },

    /// Transport failure (DNS, connection refused, timeout, TLS, bad URL)
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Consumes the result, returning the body if there is one
    pub fn into_body(self) -> Option<Vec<u8>> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failed { .. } => None,
        }
    }
}

/// Source of page content
///
/// Implementations must never panic or return errors for an unreachable URL;
/// every failure is reported as `FetchResult::Failed`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns its body or a failure
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Sends a GET request
    ///
    /// Any HTTP response counts as content, error statuses included; the body
    /// is what gets scanned. Only transport failures produce `Failed`.
    async fn fetch(&self, url: &str) -> FetchResult {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else if e.is_redirect() {
                    "Too many redirects".to_string()
                } else {
                    e.to_string()
                };
                tracing::debug!("Fetch failed for {}: {}", url, error);
                return FetchResult::Failed { error };
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            tracing::debug!("HTTP {} for {}", status.as_u16(), url);
        }

        match response.bytes().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body: body.to_vec(),
            },
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", url, e);
                FetchResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Serves pages from memory; unknown URLs fail
///
/// Every requested URL is recorded, in request order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page, builder style
    pub fn with_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }

    /// Adds or replaces a page
    pub fn insert(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.pages.insert(url.to_string(), body.into());
    }

    /// Returns every URL requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        match self.pages.get(url) {
            Some(body) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                body: body.clone(),
            },
            None => FetchResult::Failed {
                error: format!("no page for {}", url),
            },
        }
    }
}
