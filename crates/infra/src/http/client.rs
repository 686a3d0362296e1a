//! reqwest-backed [`Transport`] with classified retries

use std::time::Duration;

use async_trait::async_trait;
use edgebulk_common::resilience::{policies, BackoffStrategy, RetryConfig, RetryExecutor};
use edgebulk_core::{HttpMethod, Transport};
use edgebulk_domain::{ApiConfig, EdgeBulkError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method};
use tracing::{debug, warn};
use url::Url;

use crate::api::envelope::error_summary;
use crate::errors::{status_error, InfraError};

const USER_AGENT: &str = concat!("edgebulk/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Authenticated API transport with retry on transient failures.
///
/// Every request carries the bearer token and a JSON content type. Errors
/// the domain classifies as retryable (connection failures, timeouts, 429
/// and 5xx) are retried with exponential backoff until `max_attempts` is
/// used up; any other non-success status is returned immediately.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
    retry: RetryExecutor<policies::ClassifiedRetry>,
}

impl HttpTransport {
    /// Start building a transport for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(base_url)
    }

    /// Transport configured from the `api` section of the config.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::builder(&config.base_url)
            .api_token(&config.api_token)
            .timeout(config.request_timeout)
            .max_attempts(config.max_attempts)
            .build()
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry settings applied to every request.
    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }

    /// Absolute URL for an API path. The base path is kept, so
    /// `/zones` under `https://host/client/v4` becomes `https://host/client/v4/zones`.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| InfraError::from(err).into())
    }

    /// One round trip. Non-success statuses come back as classified errors
    /// so the retry policy can tell throttling from bad requests.
    async fn attempt(
        &self,
        method: HttpMethod,
        url: Url,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let mut builder = self.client.request(to_reqwest(method), url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        debug!(%method, path, "sending HTTP request");
        let response = builder.send().await.map_err(InfraError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(InfraError::from)?;
        debug!(%method, path, %status, "received HTTP response");

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message =
            error_summary(&bytes).unwrap_or_else(|| format!("{method} {path} returned {status}"));
        Err(status_error(status.as_u16(), message))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        let body = body.as_deref();

        let outcome = self
            .retry
            .execute(|| self.attempt(method, url.clone(), path, query, body))
            .await;

        outcome.map_err(|err| {
            let attempts = err.attempts();
            let err = err.into_source().unwrap_or_else(|| {
                EdgeBulkError::Internal("transport retry configuration is invalid".into())
            });
            warn!(
                %method,
                path,
                attempts,
                status = ?err.status(),
                error = %err,
                "API request failed"
            );
            err
        })
    }
}

fn to_reqwest(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    user_agent: String,
}

impl HttpTransportBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Bearer token sent on every request; blank tokens are omitted.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry; it doubles on each later one.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Validate the base URL and build the client.
    pub fn build(self) -> Result<HttpTransport> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(InfraError::from)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EdgeBulkError::Config(format!(
                "API base URL must be http(s), got '{base_url}'"
            )));
        }

        let retry = RetryConfig {
            max_attempts: self.max_attempts.max(1),
            backoff: BackoffStrategy::Exponential {
                initial_delay: self.base_backoff,
                base: 2.0,
                max_delay: MAX_BACKOFF.max(self.base_backoff),
            },
        };
        retry.validate().map_err(|err| EdgeBulkError::Config(err.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.api_token.filter(|token| !token.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                EdgeBulkError::Config("API token contains characters not valid in a header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .default_headers(headers)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;

        Ok(HttpTransport {
            client,
            base_url,
            retry: RetryExecutor::new(retry, policies::ClassifiedRetry),
        })
    }
}
