//! Domain types and models

pub mod batch;
pub mod pagination;
pub mod progress;
pub mod zone;

pub use batch::{ChunkError, ChunkFailure, FanOutResult, OperationResult, ZoneOutcome};
pub use pagination::{Page, PaginationSummary, StopReason};
pub use progress::{FanOutProgress, ProgressEvent};
pub use zone::{is_canonical_zone_id, Zone, ZoneId, ZoneMatchEntry};
