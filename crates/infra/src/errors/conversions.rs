//! Conversions from external infrastructure errors into domain errors.

use edgebulk_domain::EdgeBulkError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EdgeBulkError);

impl From<InfraError> for EdgeBulkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EdgeBulkError> for InfraError {
    fn from(value: EdgeBulkError) -> Self {
        InfraError(value)
    }
}

trait IntoEdgeBulkError {
    fn into_edgebulk(self) -> EdgeBulkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → EdgeBulkError */
/* -------------------------------------------------------------------------- */

impl IntoEdgeBulkError for HttpError {
    fn into_edgebulk(self) -> EdgeBulkError {
        if self.is_timeout() {
            return EdgeBulkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return EdgeBulkError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return EdgeBulkError::Serialization(format!("failed to decode HTTP response: {self}"));
        }

        if self.is_builder() {
            return EdgeBulkError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return status_error(code, message);
        }

        EdgeBulkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_edgebulk())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → EdgeBulkError */
/* -------------------------------------------------------------------------- */

impl IntoEdgeBulkError for UrlError {
    fn into_edgebulk(self) -> EdgeBulkError {
        EdgeBulkError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_edgebulk())
    }
}

/// Map a non-success HTTP status onto the domain taxonomy.
///
/// 401/403 are credential problems and 404 a missing resource; everything
/// else keeps its status so callers can tell throttling and server faults
/// apart from bad requests.
pub fn status_error(status: u16, message: String) -> EdgeBulkError {
    match status {
        401 | 403 => EdgeBulkError::Auth(message),
        404 => EdgeBulkError::NotFound(message),
        _ => EdgeBulkError::Api { status, message },
    }
}
