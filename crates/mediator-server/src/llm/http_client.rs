// crates/mediator-server/src/llm/http_client.rs
// JSON POST transport with bounded retries for chat providers

use crate::utils::truncate;
use anyhow::{Result, anyhow};
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::warn;

/// Provider error bodies can be large HTML pages
const ERROR_BODY_PREVIEW: usize = 500;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How transient failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each one after
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_backoff.saturating_mul(1u32 << retry.min(16))
    }
}

/// Rate limits and server-side errors are worth another attempt
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Only failures where the request never reached the provider, or stalled
fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

pub struct LlmHttpClient {
    client: Client,
    pub(crate) retry: RetryPolicy,
}

impl Default for LlmHttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }
}

impl LlmHttpClient {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// POST `body` as JSON, with Bearer auth when `api_key` is set.
    /// Returns the response body on a 2xx status.
    pub async fn post_json(
        &self,
        request_id: &str,
        url: &str,
        api_key: Option<&str>,
        body: String,
    ) -> Result<String> {
        let mut retry = 0;

        loop {
            let mut request = self
                .client
                .post(url)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.clone());
            if let Some(key) = api_key {
                request = request.bearer_auth(key);
            }

            let failure = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response) => {
                    let status = response.status();
                    let detail = truncate(
                        &response.text().await.unwrap_or_default(),
                        ERROR_BODY_PREVIEW,
                    );
                    let err = anyhow!("API error {}: {}", status, detail);
                    if !is_retryable_status(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) if is_retryable_error(&e) => anyhow!("request failed: {}", e),
                Err(e) => return Err(anyhow!("request failed: {}", e)),
            };

            if retry >= self.retry.max_retries {
                return Err(failure);
            }

            let delay = self.retry.backoff(retry);
            retry += 1;
            warn!(
                request_id,
                retry,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient provider failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
