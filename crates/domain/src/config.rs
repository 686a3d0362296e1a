//! Engine configuration
//!
//! Every engine component takes its configuration explicitly; there is no
//! process-wide mutable state. Values outside their valid range are clamped
//! by the `effective_*` accessors rather than rejected, except where
//! [`Config::validate`] says otherwise.

use std::fmt;
use std::time::Duration;

use edgebulk_common::utils::serde::{duration_millis, option_duration_millis};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_HTTP_MAX_ATTEMPTS,
    DEFAULT_LOG_FILTER, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_ZONE_CONCURRENCY,
    DEFAULT_PAGINATION_BACKOFF, DEFAULT_PAGINATION_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_ZONE_CONCURRENCY,
};
use crate::errors::{EdgeBulkError, Result};

/// Chunking and per-operation parallelism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Items per remote call
    pub batch_size: usize,
    /// Requested number of chunks in flight
    pub concurrency: usize,
    /// Upper bound for `concurrency`, set per operation type
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl BatchConfig {
    /// Batch settings with the default concurrency ceiling.
    pub fn new(batch_size: usize, concurrency: usize) -> Self {
        Self { batch_size, concurrency, ..Self::default() }
    }

    /// Raise or lower the concurrency ceiling.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Batch size, never below one.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// `concurrency` clamped to `[1, max_concurrency]`.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, self.max_concurrency.max(1))
    }
}

/// Zone-level parallelism on top of a per-zone [`BatchConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// Chunking inside each zone
    pub batch: BatchConfig,
    /// Zones processed at once
    pub zone_concurrency: usize,
    /// Upper bound for `zone_concurrency`
    pub max_zone_concurrency: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            zone_concurrency: DEFAULT_ZONE_CONCURRENCY,
            max_zone_concurrency: DEFAULT_MAX_ZONE_CONCURRENCY,
        }
    }
}

impl FanOutConfig {
    /// `zone_concurrency` clamped to `[1, max_zone_concurrency]`.
    pub fn effective_zone_concurrency(&self) -> usize {
        self.zone_concurrency.clamp(1, self.max_zone_concurrency.max(1))
    }
}

/// Cursor pagination limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Retries per page after the first attempt
    pub max_retries: u32,
    /// Fixed delay between page retries
    #[serde(with = "duration_millis")]
    pub retry_backoff: Duration,
    /// Wall-clock budget for the whole run
    #[serde(with = "option_duration_millis")]
    pub timeout: Option<Duration>,
    /// Maximum number of pages to fetch
    pub page_limit: Option<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_PAGINATION_MAX_RETRIES,
            retry_backoff: DEFAULT_PAGINATION_BACKOFF,
            timeout: None,
            page_limit: None,
        }
    }
}

impl PaginationConfig {
    /// Stop the run once `timeout` has elapsed.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stop after `page_limit` pages.
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = Some(page_limit);
        self
    }

    /// Per-page retry count and fixed delay.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, retry_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = retry_backoff;
        self
    }

    /// Total fetch attempts allowed per page
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// HTTP API access
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.cloudflare.com/client/v4`
    pub base_url: String,
    /// Bearer token; redacted from `Debug` output
    pub api_token: String,
    /// Account owning the KV namespaces
    pub account_id: Option<String>,
    /// Per-request timeout
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
    /// Transport-level attempts per request (throttling, 5xx and connection failures)
    pub max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: String::new(),
            account_id: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
        }
    }
}

impl ApiConfig {
    /// Defaults with the given token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self { api_token: api_token.into(), ..Self::default() }
    }

    /// Point at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Account used for KV calls.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

// Keep the token out of logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &if self.api_token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("account_id", &self.account_id)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[api]`: endpoint, credentials and transport retries
    pub api: ApiConfig,
    /// `[batch]`: chunking for single-zone runs
    pub batch: BatchConfig,
    /// `[fan_out]`: multi-zone runs
    pub fan_out: FanOutConfig,
    /// `[pagination]`: listing limits
    pub pagination: PaginationConfig,
    /// `[logging]`
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that cannot be clamped into something meaningful.
    pub fn validate(&self) -> Result<()> {
        if self.api.api_token.trim().is_empty() {
            return Err(EdgeBulkError::Config("api.api_token is required".to_string()));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(EdgeBulkError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.max_attempts == 0 {
            return Err(EdgeBulkError::Config("api.max_attempts must be >= 1".to_string()));
        }
        for (field, value) in [
            ("batch.batch_size", self.batch.batch_size),
            ("batch.max_concurrency", self.batch.max_concurrency),
            ("fan_out.batch.batch_size", self.fan_out.batch.batch_size),
            ("fan_out.max_zone_concurrency", self.fan_out.max_zone_concurrency),
        ] {
            if value == 0 {
                return Err(EdgeBulkError::Config(format!("{field} must be >= 1")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_clamped() {
        assert_eq!(BatchConfig::new(100, 0).effective_concurrency(), 1);
        assert_eq!(BatchConfig::new(100, 7).effective_concurrency(), 7);
        assert_eq!(BatchConfig::new(100, 99).effective_concurrency(), 20);
        assert_eq!(BatchConfig::new(100, 99).with_max_concurrency(50).effective_concurrency(), 50);
        assert_eq!(BatchConfig::new(0, 1).effective_batch_size(), 1);
    }

    #[test]
    fn zone_concurrency_is_clamped() {
        let config = FanOutConfig { zone_concurrency: 9, ..FanOutConfig::default() };
        assert_eq!(config.effective_zone_concurrency(), 5);
        assert_eq!(FanOutConfig::default().effective_zone_concurrency(), 3);
    }

    #[test]
    fn validate_requires_token() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(EdgeBulkError::Config(_))));

        config.api.api_token = "secret".into();
        assert!(config.validate().is_ok());

        config.batch.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.batch_size"));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", ApiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api": {"api_token": "t"}, "pagination": {"retry_backoff": 250, "page_limit": 4}}"#,
        )
        .unwrap();

        assert_eq!(config.batch, BatchConfig::default());
        assert_eq!(config.pagination.retry_backoff, Duration::from_millis(250));
        assert_eq!(config.pagination.page_limit, Some(4));
        assert_eq!(config.pagination.timeout, None);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
    }
}
