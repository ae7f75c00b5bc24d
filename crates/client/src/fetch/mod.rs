//! Authenticated fetch pipeline with bounded retries.
//!
//! Every request against the catalog API flows through here. Each attempt
//! asks the token guard for a fresh Authorization header (never cached
//! across attempts, so a renewal triggered mid-retry takes effect), then
//! issues a GET and expects a success status with a JSON body. Transient
//! failures are retried up to the configured bound; an exhausted bound is
//! reported as `Error::RetriesExhausted`, which callers treat as
//! "page/item unavailable" rather than a crash.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, header};
use serde_json::Value;

use crate::auth::TokenGuard;
use imago_core::Error;

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "imago/0.1";

/// Build the HTTP client shared by the fetch and download paths.
///
/// The configured timeout bounds each request's total wall-clock time.
pub fn build_http_client(timeout: Duration) -> Result<Client, Error> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(timeout)
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))
}

/// Authenticated GET client with a bounded retry loop.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
    token: Arc<TokenGuard>,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(http: Client, token: Arc<TokenGuard>, max_retries: u32) -> Self {
        Self { http, token, max_retries }
    }

    /// Fetch a JSON document, retrying transient failures.
    ///
    /// Makes at most `max_retries` attempts. Auth failures, network
    /// faults, non-success statuses, and unparseable bodies all count one
    /// attempt.
    ///
    /// # Errors
    ///
    /// `Error::RetriesExhausted` carrying the attempt count once the bound
    /// is spent.
    pub async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        for attempt in 1..=self.max_retries {
            match self.attempt(url, params).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(
                        "fetch attempt {}/{} for {} failed: {}",
                        attempt,
                        self.max_retries,
                        url,
                        e
                    );
                }
            }
        }
        Err(Error::RetriesExhausted { url: url.to_string(), attempts: self.max_retries })
    }

    /// One authenticated GET attempt.
    async fn attempt(&self, url: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        let auth = self.token.authorization_header().await?;

        let response = self
            .http
            .get(url)
            .query(params)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Parse(format!("invalid JSON body from {url}: {e}")))
    }
}
