//! Authenticating HTTP client with retry and backoff
//!
//! Every content call goes through [`RetryingClient::get_json`], which:
//! - injects the bearer token and client id headers
//! - force-refreshes the credential once on a 401
//! - retries 5xx, 429 and transient transport failures with exponential
//!   backoff plus jitter

use super::backoff::RetryPolicy;
use crate::auth::{OAuthConfig, TokenManager};
use crate::error::{is_retryable_status, is_transient_transport, Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Source of JSON documents addressed by path and ordered query pairs.
///
/// The sweep scheduler depends only on this seam.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one JSON document
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value>;
}

/// Configuration for the retrying client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative paths are joined onto
    pub base_url: String,
    /// Per-call request timeout
    pub timeout: Duration,
    /// Retry policy for server and transport failures
    pub retry: RetryPolicy,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Create a config with default timeout and retry policy
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: format!("quran-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// HTTP client that authenticates and retries content calls
pub struct RetryingClient {
    client: Client,
    base_url: Url,
    config: HttpClientConfig,
    tokens: TokenManager,
}

impl RetryingClient {
    /// Build a client; the token manager shares the same connection pool
    pub fn new(config: HttpClientConfig, oauth: OAuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let base_url = Url::parse(&config.base_url)?;
        let tokens = TokenManager::with_client(oauth, client.clone());

        Ok(Self {
            client,
            base_url,
            config,
            tokens,
        })
    }

    /// Token manager backing this client
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Retry policy in effect
    pub fn policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// Execute one GET with the full resilience policy and decode JSON.
    ///
    /// The 401 path and the backoff path are counted separately: a forced
    /// refresh never consumes a backoff slot and vice versa.
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let url = self.build_url(path)?;
        let policy = self.config.retry;
        let mut attempt: u32 = 0;
        let mut refreshed = false;

        loop {
            let credential = self.tokens.obtain(false).await?;

            match self.send(&url, query, &credential.token).await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED && !refreshed {
                        warn!(url = %url, "401 received, forcing token refresh");
                        self.tokens.refresh_rejected(&credential.token).await?;
                        refreshed = true;
                        continue;
                    }

                    if status.is_success() {
                        debug!(url = %url, attempt, "request succeeded");
                        return decode_body(response).await;
                    }

                    let floor = retry_after(&response);
                    let body = response.text().await.unwrap_or_default();

                    if is_retryable_status(status.as_u16()) && policy.allows(attempt) {
                        attempt += 1;
                        let delay = policy.jittered_delay(attempt).max(floor);
                        warn!(
                            url = %url,
                            status = status.as_u16(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after server response"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!(url = %url, status = status.as_u16(), attempt, "request failed");
                    return Err(Error::http_status(status.as_u16(), body));
                }
                Err(e) => {
                    if is_transient_transport(&e) && policy.allows(attempt) {
                        attempt += 1;
                        let delay = policy.jittered_delay(attempt);
                        warn!(
                            url = %url,
                            error = %e,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after transport failure"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!(url = %url, error = %e, attempt, "request failed");
                    return Err(Error::Http(e));
                }
            }
        }
    }

    async fn send(
        &self,
        url: &Url,
        query: &[(String, String)],
        token: &str,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut request = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header("x-auth-token", token)
            .header("x-client-id", self.tokens.client_id())
            .timeout(self.config.timeout);

        if !query.is_empty() {
            request = request.query(query);
        }

        request.send().await
    }

    /// Join a relative path onto the base URL; absolute URLs pass through
    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

#[async_trait]
impl ContentSource for RetryingClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        RetryingClient::get_json(self, path, query).await
    }
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

async fn decode_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::decode(format!("response is not valid JSON: {e}")))
}

/// Numeric `Retry-After` header as a delay floor
fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(Duration::ZERO, Duration::from_secs)
}
