//! Error types used throughout edgebulk

use std::time::Duration;

use edgebulk_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for edgebulk
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EdgeBulkError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failures and timeouts; retryable
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success API status; 429 and 5xx are retryable
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Rejected credentials (401/403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unknown zone, namespace or resource (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied values the API would reject
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request or response (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bug or broken invariant inside edgebulk
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for edgebulk operations
pub type Result<T> = std::result::Result<T, EdgeBulkError>;

impl EdgeBulkError {
    /// Build an API error from an HTTP status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    /// HTTP status carried by the error, if it came from the API
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ErrorClassification for EdgeBulkError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Info,
            Self::Network(_) | Self::Auth(_) => ErrorSeverity::Warning,
            Self::Api { status, .. } if *status == 429 => ErrorSeverity::Warning,
            Self::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl From<CommonError> for EdgeBulkError {
    fn from(err: CommonError) -> Self {
        match &err {
            CommonError::Config { .. } => Self::Config(err.to_string()),
            CommonError::Serialization { .. } => Self::Serialization(err.to_string()),
            CommonError::RateLimitExceeded { .. } => Self::api(429, err.to_string()),
            CommonError::Timeout { .. } | CommonError::Backend { .. } => {
                Self::Network(err.to_string())
            }
            CommonError::Validation { .. } => Self::InvalidInput(err.to_string()),
            CommonError::NotFound { .. } => Self::NotFound(err.to_string()),
            CommonError::Unauthorized { .. } => Self::Auth(err.to_string()),
            CommonError::Internal { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for EdgeBulkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_classify_by_status() {
        assert!(EdgeBulkError::api(503, "unavailable").is_retryable());
        assert!(EdgeBulkError::api(429, "slow down").is_retryable());
        assert!(!EdgeBulkError::api(400, "bad tags").is_retryable());
        assert_eq!(EdgeBulkError::api(400, "bad").status(), Some(400));
        assert_eq!(EdgeBulkError::Network("reset".into()).status(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(EdgeBulkError::NotFound("zone x".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "NotFound", "message": "zone x"}));

        let api = serde_json::to_value(EdgeBulkError::api(502, "bad gateway")).unwrap();
        assert_eq!(api["type"], "Api");
        assert_eq!(api["message"]["status"], 502);
    }

    #[test]
    fn common_errors_map_onto_variants() {
        let err: EdgeBulkError = CommonError::validation("batch_size", "must be >= 1").into();
        assert!(matches!(err, EdgeBulkError::InvalidInput(_)));

        let err: EdgeBulkError = CommonError::rate_limit(None).into();
        assert_eq!(err.status(), Some(429));
    }
}
