//! HTTP client for the chain API with request logging.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::config::SnapshotConfig;
use crate::error::AppError;

/// User agent string for all chain API requests.
const CLIENT_USER_AGENT: &str = concat!("hypha-snapshot/", env!("CARGO_PKG_VERSION"));

// ─────────────────────────────────────────────────────────────────────────────
// ChainClient
// ─────────────────────────────────────────────────────────────────────────────

/// Thin wrapper around `reqwest::Client` bound to one API node.
///
/// Requests are never retried; a failed send surfaces as
/// `AppError::ConnectionFailed`.
#[derive(Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ChainClient {
    /// Creates a client for the node at `api_url`.
    ///
    /// # Errors
    ///
    /// - `AppError::Config` if `api_url` is not a valid URL
    /// - `AppError::Internal` if the HTTP client fails to initialize
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(api_url)
            .map_err(|e| AppError::Config(format!("Invalid api_url {:?}: {}", api_url, e)))?;
        let http = build_http_client(timeout)?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &SnapshotConfig) -> Result<Self, AppError> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    /// Builds a full URL by joining `path` onto the node's base URL.
    pub fn build_url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|_| AppError::Internal(format!("Invalid path: {}", path)))
    }

    /// POSTs `body` as JSON to `path`.
    ///
    /// The response is returned whatever its status; callers map error bodies.
    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, AppError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        let request = self.http.post(url.as_str()).json(body);
        self.execute_with_logging(request, &url).await
    }

    /// Executes a request with timing and logging. Bodies are never logged.
    async fn execute_with_logging(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, AppError> {
        let start = Instant::now();
        let result = request.send().await;
        let duration_ms = start.elapsed().as_millis();

        match result {
            Ok(response) => {
                info!(
                    "[CHAIN] POST {} {} {}ms",
                    url.path(),
                    response.status().as_u16(),
                    duration_ms
                );
                Ok(response)
            }
            Err(e) => {
                info!("[CHAIN] POST {} FAILED {}ms", url.path(), duration_ms);
                let reason = if e.is_timeout() {
                    "request timed out"
                } else if e.is_connect() {
                    "could not connect"
                } else {
                    "request failed"
                };
                Err(AppError::ConnectionFailed(format!(
                    "{} ({})",
                    reason,
                    self.base_url.host_str().unwrap_or("unknown host")
                )))
            }
        }
    }
}

/// Builds the configured HTTP client.
fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
