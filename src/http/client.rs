use std::time::Duration;

use reqwest::{
    header::{HeaderMap, RETRY_AFTER},
    Method, Request, RequestBuilder, Response, StatusCode,
};

use crate::error::AppResult;

/// Statuses that are worth retrying on an idempotent request
pub const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Statuses whose `Retry-After` header replaces the computed backoff
const RETRY_AFTER_STATUSES: [StatusCode; 2] =
    [StatusCode::TOO_MANY_REQUESTS, StatusCode::SERVICE_UNAVAILABLE];

/// Longest server-requested delay we are willing to sleep
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Retry behaviour for transient failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff_factor * 2^(n-1)`
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before the given retry (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1u32 << exponent)
    }

    pub fn is_retryable_method(method: &Method) -> bool {
        *method == Method::GET || *method == Method::HEAD
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRY_STATUSES.contains(&status)
    }

    /// Transport failures: refused or reset connections and timeouts.
    /// Builder, status and body decode errors are final.
    pub fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() || error.is_status() || error.is_decode() {
            return false;
        }
        error.is_connect() || error.is_request() || error.is_timeout()
    }

    /// Delay requested through `Retry-After` on a 429 or 503, capped at
    /// [`MAX_RETRY_AFTER`]. Only the delay-seconds form is understood.
    pub fn retry_after(status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
        if !RETRY_AFTER_STATUSES.contains(&status) {
            return None;
        }
        let seconds = headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
    }
}

/// Settings for one shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Skip certificate verification. TLS is still negotiated.
    pub accept_invalid_certs: bool,
    pub retry: RetryPolicy,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            accept_invalid_certs: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpClientConfig {
    /// Settings for the poster CDN path, where certificate checks are relaxed
    pub fn for_images(timeout: Duration) -> Self {
        Self {
            timeout,
            accept_invalid_certs: true,
            ..Self::default()
        }
    }

    /// Settings for the authenticated metadata API
    pub fn for_api(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Connection-pooled client with retry on transient failures
///
/// Build it once at startup with [`build_client`] and clone it where needed;
/// clones share the same pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    retry: RetryPolicy,
}

/// Creates the shared HTTP client
///
/// Construction sets up the connection pool and TLS backend, so callers must
/// reuse the returned client instead of building one per request.
pub fn build_client(config: &HttpClientConfig) -> AppResult<HttpClient> {
    let inner = reqwest::Client::builder()
        .timeout(config.timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;

    tracing::debug!(
        timeout_secs = config.timeout.as_secs(),
        pool_max_idle_per_host = config.pool_max_idle_per_host,
        accept_invalid_certs = config.accept_invalid_certs,
        max_retries = config.retry.max_retries,
        "Built HTTP client"
    );

    Ok(HttpClient {
        inner,
        retry: config.retry.clone(),
    })
}

impl HttpClient {
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.inner.get(url)
    }

    pub fn head(&self, url: &str) -> RequestBuilder {
        self.inner.head(url)
    }

    /// Sends a request, retrying idempotent methods on transient failures
    ///
    /// When the retry budget runs out on a retryable status, the last response
    /// is returned so the caller can inspect it.
    pub async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let request = builder.build()?;
        Ok(self.execute_with_retry(request).await?)
    }

    async fn execute_with_retry(&self, request: Request) -> Result<Response, reqwest::Error> {
        let retryable = RetryPolicy::is_retryable_method(request.method());
        let mut retry = 0;

        loop {
            // Bodies of GET/HEAD are always clonable; anything else gets a single shot.
            let attempt = match request.try_clone() {
                Some(attempt) if retryable && retry < self.retry.max_retries => attempt,
                _ => return self.inner.execute(request).await,
            };

            retry += 1;
            let delay = match self.inner.execute(attempt).await {
                Ok(response) if RetryPolicy::is_retryable_status(response.status()) => {
                    let delay = RetryPolicy::retry_after(response.status(), response.headers())
                        .unwrap_or_else(|| self.retry.backoff_for(retry));
                    tracing::warn!(
                        url = %request.url(),
                        status = %response.status(),
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable status, backing off"
                    );
                    delay
                }
                Ok(response) => return Ok(response),
                Err(e) if RetryPolicy::is_retryable_error(&e) => {
                    tracing::warn!(
                        url = %request.url(),
                        error = %e,
                        retry,
                        "Transport error, backing off"
                    );
                    self.retry.backoff_for(retry)
                }
                Err(e) => return Err(e),
            };

            tokio::time::sleep(delay).await;
        }
    }
}
