//! Generic retry executor with pluggable backoff and retry policies
//!
//! Used wherever a single logical call may be attempted several times, for
//! example fetching one page of a cursor-paginated listing. The executor
//! owns the attempt loop; callers decide which errors are worth retrying via
//! a [`RetryPolicy`].

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted; `source` is the last error
    #[error("All retry attempts exhausted after {attempts} tries: {source:?}")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The operation failed with an error the policy refused to retry
    #[error("Operation failed with non-retryable error after {attempts} tries: {source:?}")]
    NonRetryable { attempts: u32, source: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up (0 for configuration errors)
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. } | Self::NonRetryable { attempts, .. } => {
                *attempts
            }
            Self::InvalidConfiguration { .. } => 0,
        }
    }

    /// Consume the error and return the operation's last error, if any
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source, .. } => {
                Some(source)
            }
            Self::InvalidConfiguration { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Final value, or why the executor gave up.
    pub result: RetryResult<T, E>,
    /// Attempts made, the first one included.
    pub attempts: u32,
    /// Time spent sleeping between attempts.
    pub total_delay: Duration,
    /// When the first attempt started.
    pub first_attempt_time: Instant,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Number of retries performed (attempts beyond the first).
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Get the total elapsed time from first attempt to completion.
    pub fn total_elapsed(&self) -> Duration {
        self.first_attempt_time.elapsed()
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a
    /// custom delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay after the given (0-based) failed attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_secs_f64() * base.powi(exponent);
                if delay.is_finite() && delay < max_delay.as_secs_f64() {
                    Duration::from_secs_f64(delay)
                } else {
                    *max_delay
                }
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (initial try included)
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
        }
    }
}

impl RetryConfig {
    /// Fixed-delay configuration allowing `retries` retries after the first
    /// attempt.
    pub fn fixed(retries: u32, delay: Duration) -> Self {
        Self { max_attempts: retries.saturating_add(1), backoff: BackoffStrategy::Fixed(delay) }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Configuration this executor runs with
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let first_attempt_time = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);
        let mut total_delay = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            let attempt_number = attempt + 1;
            debug!("Executing operation (attempt {}/{})", attempt_number, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt_number,
                        total_delay,
                        first_attempt_time,
                    };
                }
                Err(error) => error,
            };

            if attempt_number >= max_attempts {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {:?}",
                    attempt_number, error
                );
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted {
                        attempts: attempt_number,
                        source: error,
                    }),
                    attempts: attempt_number,
                    total_delay,
                    first_attempt_time,
                };
            }

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!("Retry policy determined not to retry: {:?}", error);
                    return RetryOutcome {
                        result: Err(RetryError::NonRetryable {
                            attempts: attempt_number,
                            source: error,
                        }),
                        attempts: attempt_number,
                        total_delay,
                        first_attempt_time,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                RetryDecision::RetryAfter(custom_delay) => custom_delay,
            };

            warn!(
                "Operation failed (attempt {}), retrying after {:?}: {:?}",
                attempt_number, delay, error
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::*;
    use crate::error::ErrorClassification;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Retries errors whose [`ErrorClassification::is_retryable`] is true,
    /// honouring any `retry_after` hint.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ClassifiedRetry;

    impl<E: ErrorClassification> RetryPolicy<E> for ClassifiedRetry {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if !error.is_retryable() {
                return RetryDecision::Stop;
            }
            match error.retry_after() {
                Some(delay) => RetryDecision::RetryAfter(delay),
                None => RetryDecision::Retry,
            }
        }
    }
}
