//! Common error types and utilities
//!
//! This module provides the error vocabulary shared by every edgebulk crate.
//!
//! # Error Handling Architecture
//!
//! 1. **`CommonError`**: error patterns that recur across modules (timeouts,
//!    rate limiting, serialization, backend failures, ...).
//!
//! 2. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability, severity and criticality.
//!
//! 3. **`ErrorSeverity` enum**: a unified severity level for logging
//!    decisions.
//!
//! ## Composition
//!
//! Module-specific errors should **compose** with `CommonError` rather than
//! duplicating common patterns:
//!
//! ```rust,ignore
//! #[derive(Debug, Error)]
//! pub enum PurgeError {
//!     #[error("Zone has no purgeable content: {0}")]
//!     Empty(String),
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//! ```
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Zone not found, empty listing |
//! | **Warning** | Degraded but operational | Rate limiting, transient failures |
//! | **Error** | Failure requiring attention | Network errors, invalid input |
//! | **Critical** | Integrity at risk | Internal invariant violations |

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Common error variants that appear across multiple modules
#[derive(Debug, Clone, PartialEq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String, field: Option<String> },

    /// Serialization or deserialization errors
    Serialization { message: String, format: Option<String> },

    /// Rate limiting errors
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Timeout errors
    Timeout { operation: String, duration: Duration },

    /// Network or backend connectivity errors
    Backend { service: String, message: String, is_retryable: bool },

    /// Validation errors
    Validation { field: String, message: String, value: Option<String> },

    /// Resource not found errors
    NotFound { resource_type: String, identifier: Option<String> },

    /// Permission or authorization errors
    Unauthorized { operation: String },

    /// Internal errors that shouldn't normally occur
    Internal { message: String, context: Option<String> },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field } => {
                if let Some(field) = field {
                    write!(f, "Configuration error in field '{}': {}", field, message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::Serialization { message, format } => {
                if let Some(format) = format {
                    write!(f, "Serialization error ({}): {}", format, message)
                } else {
                    write!(f, "Serialization error: {}", message)
                }
            }
            Self::RateLimitExceeded { retry_after } => {
                if let Some(retry) = retry_after {
                    write!(f, "Rate limit exceeded (retry in {:?})", retry)
                } else {
                    write!(f, "Rate limit exceeded")
                }
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{}' timed out after {:?}", operation, duration)
            }
            Self::Backend { service, message, .. } => {
                write!(f, "Backend error from '{}': {}", service, message)
            }
            Self::Validation { field, message, value } => {
                if let Some(value) = value {
                    write!(f, "Validation failed for '{}' (value: '{}'): {}", field, value, message)
                } else {
                    write!(f, "Validation failed for '{}': {}", field, message)
                }
            }
            Self::NotFound { resource_type, identifier } => {
                if let Some(id) = identifier {
                    write!(f, "{} not found: '{}'", resource_type, id)
                } else {
                    write!(f, "{} not found", resource_type)
                }
            }
            Self::Unauthorized { operation } => {
                write!(f, "Unauthorized to perform '{}'", operation)
            }
            Self::Internal { message, context } => {
                if let Some(ctx) = context {
                    write!(f, "Internal error in '{}': {}", ctx, message)
                } else {
                    write!(f, "Internal error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } => true,
            Self::Backend { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Serialization { .. } => ErrorSeverity::Error,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Backend { .. } => ErrorSeverity::Error,
            Self::Validation { .. } => ErrorSeverity::Error,
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::Unauthorized { .. } => ErrorSeverity::Warning,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a simple serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into(), format: None }
    }

    /// Create a serialization error with format information
    pub fn serialization_format<S: Into<String>, F: Into<String>>(format: F, message: S) -> Self {
        Self::Serialization { message: message.into(), format: Some(format.into()) }
    }

    /// Create a rate limit error
    pub fn rate_limit(retry_after: Option<Duration>) -> Self {
        Self::RateLimitExceeded { retry_after }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    /// Create a backend error
    pub fn backend<S: Into<String>, M: Into<String>>(
        service: S,
        message: M,
        is_retryable: bool,
    ) -> Self {
        Self::Backend { service: service.into(), message: message.into(), is_retryable }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: None }
    }

    /// Create a validation error with the invalid value
    pub fn validation_with_value<F: Into<String>, M: Into<String>, V: Into<String>>(
        field: F,
        message: M,
        value: V,
    ) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: Some(value.into()) }
    }

    /// Create a not found error with identifier
    pub fn not_found_with_id<T: Into<String>, I: Into<String>>(
        resource_type: T,
        identifier: I,
    ) -> Self {
        Self::NotFound { resource_type: resource_type.into(), identifier: Some(identifier.into()) }
    }

    /// Create an unauthorized error
    pub fn unauthorized<O: Into<String>>(operation: O) -> Self {
        Self::Unauthorized { operation: operation.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), context: None }
    }

    /// Create an internal error with context
    pub fn internal_with_context<S: Into<String>, C: Into<String>>(message: S, context: C) -> Self {
        Self::Internal { message: message.into(), context: Some(context.into()) }
    }

    /// Stable, snake_case name of the variant for structured logging.
    pub fn error_type_name(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Serialization { .. } => "serialization",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::Timeout { .. } => "timeout",
            Self::Backend { .. } => "backend",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Standard interface for classifying errors.
///
/// Implemented by every error type that can surface from a bulk operation so
/// callers can decide between retrying, reporting and aborting without
/// matching on concrete variants.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: timeouts, rate limiting, temporary
    /// backend unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when a specific delay is recommended (for
    /// example from a `Retry-After` header).
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

// Standard conversions from common error types
impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_format("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization_format("TOML", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CommonError::timeout("fetch_page", Duration::from_secs(1)).is_retryable());
        assert!(CommonError::rate_limit(None).is_retryable());
        assert!(CommonError::backend("api", "502", true).is_retryable());
        assert!(!CommonError::backend("api", "400", false).is_retryable());
        assert!(!CommonError::config("missing token").is_retryable());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(CommonError::not_found_with_id("zone", "x").severity(), ErrorSeverity::Info);
        assert_eq!(CommonError::internal("boom").severity(), ErrorSeverity::Critical);
        assert!(CommonError::internal("boom").is_critical());
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
    }

    #[test]
    fn test_retry_after_only_for_rate_limit() {
        let delay = Duration::from_secs(3);
        assert_eq!(CommonError::rate_limit(Some(delay)).retry_after(), Some(delay));
        assert_eq!(CommonError::timeout("x", delay).retry_after(), None);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CommonError::config_field("batch_size", "must be >= 1").to_string(),
            "Configuration error in field 'batch_size': must be >= 1"
        );
        assert_eq!(
            CommonError::not_found_with_id("zone", "example.com").to_string(),
            "zone not found: 'example.com'"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let common: CommonError = err.into();
        assert_eq!(common.error_type_name(), "serialization");
    }
}
