//! Resilient HTTP client for the Yandex Metrika API.
//!
//! One logical `get` per tool invocation: credentials are attached as a
//! default header, null-valued parameters are dropped, transient failures
//! (network errors and 500/502/503) are retried with linear backoff, and
//! 401/403 fail immediately without retry.

use crate::config::Config;
use crate::error::{MetrikaError, MetrikaResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Base endpoint for all Yandex Metrika API requests.
pub const API_BASE: &str = "https://api-metrika.yandex.net";

/// Status codes that indicate a transient upstream failure.
const RETRYABLE_STATUS_CODES: [u16; 3] = [500, 502, 503];

/// Query parameters for one upstream request.
///
/// `None` values mean "parameter absent" and are dropped before the query
/// string is built; `Some(String::new())` is transmitted as an empty value.
pub type Params = Vec<(&'static str, Option<String>)>;

/// HTTP client for the Yandex Metrika API with retry and error classification.
#[derive(Debug, Clone)]
pub struct MetrikaClient {
    http: reqwest::Client,
    base_url: Url,
    max_attempts: u32,
    retry_delay: std::time::Duration,
}

impl MetrikaClient {
    /// Create a client against the production API base.
    pub fn new(config: &Config) -> MetrikaResult<Self> {
        Self::with_base_url(config, API_BASE)
    }

    /// Create a client against an arbitrary base URL (used by tests).
    pub fn with_base_url(config: &Config, base_url: &str) -> MetrikaResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("OAuth {}", config.api_key))
                .map_err(|_| MetrikaError::config("API key contains invalid header characters"))?,
        );

        let http = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .default_headers(headers)
            .build()
            .map_err(|e| MetrikaError::config(format!("Failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| MetrikaError::config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            http,
            base_url,
            max_attempts: config.retries.max(1),
            retry_delay: config.retry_delay_duration(),
        })
    }

    /// Perform one logical GET against the API, retrying transient failures.
    ///
    /// Returns the decoded JSON payload verbatim; the caller is responsible
    /// for formatting. Parameter values of `None` are dropped, empty strings
    /// are kept.
    pub async fn get(&self, path: &str, params: Params) -> MetrikaResult<Value> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| MetrikaError::config(format!("Invalid request path {path:?}: {e}")))?;

        let query: Vec<(&str, String)> = params
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();

        let mut attempt: u32 = 1;
        loop {
            debug!(url = %url, attempt, "GET request");
            let response = match self.http.get(url.clone()).query(&query).send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt < self.max_attempts {
                        self.wait_before_retry(attempt, &format!("network error: {e}")).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(MetrikaError::transport(attempt, e.to_string()));
                }
            };

            let status = response.status().as_u16();

            if status == 401 || status == 403 {
                return Err(MetrikaError::auth(status));
            }

            if RETRYABLE_STATUS_CODES.contains(&status) {
                if attempt < self.max_attempts {
                    self.wait_before_retry(attempt, &format!("status {status}")).await;
                    attempt += 1;
                    continue;
                }
                let body = response.text().await.unwrap_or_default();
                return Err(MetrikaError::upstream(status, attempt, body));
            }

            if !response.status().is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MetrikaError::upstream(status, attempt, body));
            }

            return response
                .json::<Value>()
                .await
                .map_err(MetrikaError::Decode);
        }
    }

    /// Sleep `retry_delay * attempt` (linear backoff) before the next attempt.
    async fn wait_before_retry(&self, attempt: u32, cause: &str) {
        let delay = self.retry_delay * attempt;
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            cause,
            "Request failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }

    /// Release the client at process teardown. Invoked exactly once by the
    /// transport; the connection pool is closed when the last clone drops.
    pub async fn close(&self) {
        debug!("Yandex Metrika client released");
    }
}
