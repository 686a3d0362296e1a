//! Response envelope shared by every API endpoint
//!
//! ```json
//! { "success": true, "errors": [], "result": ..., "result_info": { "cursor": "abc" } }
//! ```

use edgebulk_domain::{EdgeBulkError, Page, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

/// Standard `{ success, errors, result, result_info }` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// False when `errors` explains the failure
    #[serde(default)]
    pub success: bool,
    /// API error codes and messages
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    /// Payload; `null` on most failures
    pub result: Option<T>,
    /// Paging metadata for list endpoints
    pub result_info: Option<ResultInfo>,
}

/// One entry of the envelope's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    /// Numeric API error code
    #[serde(default)]
    pub code: i64,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Paging metadata; which fields are present depends on the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultInfo {
    /// Cursor for the next page; empty or absent on the last page
    pub cursor: Option<String>,
    /// Items on this page
    pub count: Option<u64>,
    /// Page number for page-numbered endpoints
    pub page: Option<u64>,
    /// Requested page size
    pub per_page: Option<u64>,
    /// Items across all pages
    pub total_count: Option<u64>,
    /// Pages in the listing
    pub total_pages: Option<u64>,
}

impl ResultInfo {
    /// Page-numbered listings report completion through `page/total_pages`.
    fn is_last_page(&self) -> bool {
        matches!((self.page, self.total_pages), (Some(page), Some(total)) if page >= total)
    }
}

/// Decode a response body into an envelope.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<ApiEnvelope<T>> {
    serde_json::from_slice(body)
        .map_err(|err| EdgeBulkError::Serialization(format!("invalid API response: {err}")))
}

/// `"code: message; code: message"` from an error body, if it is an
/// envelope with at least one error.
pub fn error_summary(body: &[u8]) -> Option<String> {
    let envelope: ApiEnvelope<IgnoredAny> = serde_json::from_slice(body).ok()?;
    (!envelope.errors.is_empty()).then(|| join_messages(&envelope.errors))
}

fn join_messages(messages: &[ApiMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.code, m.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl<T> ApiEnvelope<T> {
    /// Fail unless the API reported success.
    pub fn ensure_success(&self) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let message = if self.errors.is_empty() {
            "request was not successful".to_string()
        } else {
            join_messages(&self.errors)
        };
        Err(EdgeBulkError::api(200, message))
    }

    /// The `result` payload of a successful response.
    pub fn into_result(self) -> Result<T> {
        self.ensure_success()?;
        self.result.ok_or_else(|| {
            EdgeBulkError::Serialization("successful API response has no result".to_string())
        })
    }

    /// Cursor for the next page; empty when there is none.
    pub fn next_cursor(&self) -> String {
        self.result_info.as_ref().and_then(|info| info.cursor.clone()).unwrap_or_default()
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    /// Turn a list response into a pagination [`Page`].
    ///
    /// A missing `result` is an empty page. Responses without paging
    /// metadata, or on their last numbered page, complete the listing.
    pub fn into_page(self) -> Result<Page<T>> {
        self.ensure_success()?;
        let next_cursor = self.next_cursor();
        let finished = match &self.result_info {
            None => true,
            Some(info) => info.is_last_page() && next_cursor.is_empty(),
        };

        let items = self.result.unwrap_or_default();
        Ok(if finished { Page::last(items) } else { Page::new(items, next_cursor) })
    }
}
