#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use edgebulk_domain::{BatchConfig, FanOutConfig, PaginationConfig};
use edgebulk_infra::HttpTransport;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Successful envelope around `result`.
pub fn ok_envelope(result: Value) -> Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

/// Successful list envelope with a next-page cursor (empty = last page).
pub fn page_envelope(result: Value, cursor: &str) -> Value {
    json!({
        "success": true,
        "errors": [],
        "result": result,
        "result_info": { "cursor": cursor, "count": result.as_array().map_or(0, Vec::len) }
    })
}

pub fn error_envelope(code: i64, message: &str) -> Value {
    json!({ "success": false, "errors": [{ "code": code, "message": message }], "result": null })
}

/// Transport against the mock server with near-zero backoff.
pub fn transport(server: &MockServer) -> Arc<HttpTransport> {
    let transport = HttpTransport::builder(server.uri())
        .api_token("test-token")
        .base_backoff(Duration::from_millis(1))
        .max_attempts(2)
        .build()
        .expect("transport should build");
    Arc::new(transport)
}

pub fn fast_pagination() -> PaginationConfig {
    PaginationConfig::default().with_retries(1, Duration::from_millis(1))
}

pub fn batch(batch_size: usize, concurrency: usize) -> BatchConfig {
    BatchConfig::new(batch_size, concurrency)
}

pub fn fan_out(batch_size: usize) -> FanOutConfig {
    FanOutConfig { batch: batch(batch_size, 4), ..FanOutConfig::default() }
}

/// JSON body of a received request.
pub fn body_json(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}
