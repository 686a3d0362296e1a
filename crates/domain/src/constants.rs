//! Engine and upstream API constants
//!
//! Centralized location for the numeric defaults the configuration structs
//! fall back to.

use std::time::Duration;

// Batching
/// Items per chunk.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Smaller per-request ceiling some older endpoints still enforce.
pub const LEGACY_BATCH_SIZE: usize = 30;
/// Chunks in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Ceiling the chunk concurrency is clamped to.
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

// Zone fan-out
/// Zones in flight at once.
pub const DEFAULT_ZONE_CONCURRENCY: usize = 3;
/// Ceiling the zone concurrency is clamped to.
pub const DEFAULT_MAX_ZONE_CONCURRENCY: usize = 5;

// Pagination
/// Retries per page after the first attempt.
pub const DEFAULT_PAGINATION_MAX_RETRIES: u32 = 3;
/// Fixed delay between page retries.
pub const DEFAULT_PAGINATION_BACKOFF: Duration = Duration::from_secs(1);
/// `per_page` for zone listings.
pub const DEFAULT_ZONE_PAGE_SIZE: usize = 50;
/// `limit` for KV key listings.
pub const DEFAULT_KV_PAGE_SIZE: usize = 1000;

// Zones
/// Length of a canonical zone id (lowercase or uppercase hex).
pub const ZONE_ID_LEN: usize = 32;

// HTTP
/// Public API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Transport attempts per request, the first one included.
pub const DEFAULT_HTTP_MAX_ATTEMPTS: u32 = 3;
/// Log filter when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";
