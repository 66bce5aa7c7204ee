//! Resilient HTTP client with bounded retries and backoff
//!
//! Wraps a pooled `reqwest::Client` in a retry loop: failed attempts are
//! retried with exponential backoff plus jitter, and rate-limited responses
//! trigger an extra fixed delay before the next attempt.

use std::cmp;
use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of attempts per request
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default initial backoff delay
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default backoff cap
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default extra delay after a 429 response
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Retry configuration for [`ApiClient`], immutable after construction
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts per request (at least 1)
    pub max_attempts: u32,
    /// Initial delay between attempts
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay
    pub max_delay: Duration,
    /// Extra delay applied after a rate-limited (429) response
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a validated retry policy
    ///
    /// # Returns
    /// * `Ok(RetryPolicy)` if the configuration is consistent
    /// * `Err(ClientError::InvalidPolicy)` if `max_attempts` is zero or
    ///   `base_delay` exceeds `max_delay`
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        rate_limit_delay: Duration,
    ) -> Result<Self, ClientError> {
        if max_attempts == 0 {
            return Err(ClientError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if base_delay > max_delay {
            return Err(ClientError::InvalidPolicy(
                "base_delay must not exceed max_delay".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
            rate_limit_delay,
        })
    }
}

/// The failure recorded for a single request attempt
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Server responded with a non-success status
    #[error("server returned status {0}")]
    Status(StatusCode),

    /// The request failed at the transport level
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Errors that can occur when issuing requests through [`ApiClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The retry policy is internally inconsistent
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),

    /// The URL could not be parsed; never retried
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A header name or value could not be encoded; never retried
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// All attempts were exhausted; wraps the last underlying failure
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        url: String,
        attempts: u32,
        #[source]
        source: AttemptError,
    },
}

/// HTTP client that retries failed requests with capped exponential backoff
///
/// Owns a single `reqwest::Client` whose connection pool is reused across
/// calls; the pool is released when the `ApiClient` is dropped. Safe to share
/// for sequential use; callers that want parallel in-flight requests should
/// clone one instance per task.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    policy: RetryPolicy,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client with the default retry policy
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Creates a client with a custom retry policy
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            policy,
        }
    }

    /// Creates a client over an existing `reqwest::Client`
    pub fn with_client(http: Client, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    /// Returns the retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Performs a GET request with retry
    ///
    /// # Arguments
    /// * `url` - Request URL
    /// * `headers` - Optional request headers
    /// * `params` - Optional query parameters
    ///
    /// # Returns
    /// * `Ok(Response)` - The first successful (2xx) response, unaltered
    /// * `Err(ClientError)` - Immediately for caller bugs (bad URL/header),
    ///   or `RequestFailed` once all attempts are exhausted
    pub async fn get(
        &self,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        params: Option<&HashMap<String, String>>,
    ) -> Result<Response, ClientError> {
        let parsed = parse_url(url)?;
        let headers = build_headers(headers)?;

        self.execute(url, || {
            let mut request = self.http.get(parsed.clone());
            if let Some(ref headers) = headers {
                request = request.headers(headers.clone());
            }
            if let Some(params) = params {
                request = request.query(params);
            }
            request
        })
        .await
    }

    /// Performs a POST request with retry
    ///
    /// # Arguments
    /// * `url` - Request URL
    /// * `form` - Optional form-encoded body
    /// * `headers` - Optional request headers
    pub async fn post(
        &self,
        url: &str,
        form: Option<&HashMap<String, String>>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<Response, ClientError> {
        let parsed = parse_url(url)?;
        let headers = build_headers(headers)?;

        self.execute(url, || {
            let mut request = self.http.post(parsed.clone());
            if let Some(ref headers) = headers {
                request = request.headers(headers.clone());
            }
            if let Some(form) = form {
                request = request.form(form);
            }
            request
        })
        .await
    }

    /// Runs the retry loop around a request builder
    ///
    /// A non-2xx status or transport error counts as a failed attempt. After
    /// a failed attempt that is not the last, a 429 adds `rate_limit_delay`
    /// on top of the normal backoff sleep.
    async fn execute<F>(&self, url: &str, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut delay = self.policy.base_delay;
        let mut attempt = 1;

        loop {
            let (failure, rate_limited) = match build().send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(url, attempt, "request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    warn!(url, attempt, %status, "request returned error status");
                    (
                        AttemptError::Status(status),
                        status == StatusCode::TOO_MANY_REQUESTS,
                    )
                }
                Err(err) => {
                    warn!(url, attempt, error = %err, "request failed");
                    (AttemptError::Transport(err), false)
                }
            };

            if attempt == attempts {
                return Err(ClientError::RequestFailed {
                    url: url.to_string(),
                    attempts,
                    source: failure,
                });
            }

            if rate_limited {
                tokio::time::sleep(self.policy.rate_limit_delay).await;
            }
            delay = next_backoff(delay, self.policy.max_delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Parses a URL up front so malformed input fails before any attempt
fn parse_url(url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Converts a plain string map into a `HeaderMap`
fn build_headers(headers: Option<&HashMap<String, String>>) -> Result<Option<HeaderMap>, ClientError> {
    let Some(headers) = headers else {
        return Ok(None);
    };

    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        map.insert(name, value);
    }
    Ok(Some(map))
}

/// Computes the next backoff delay: doubled, jittered, capped
///
/// Jitter is a uniform 0-1s addition so concurrent callers hitting the same
/// endpoint do not retry in lockstep.
fn next_backoff(delay: Duration, max_delay: Duration) -> Duration {
    let jitter = Duration::from_secs_f64(rand::random::<f64>());
    cmp::min(delay * 2 + jitter, max_delay)
}
