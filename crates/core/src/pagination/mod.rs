//! Cursor pagination driver
//!
//! Fetches pages until the source signals completion or runs out of
//! cursors, with per-page retry and three safety stops (wall-clock timeout,
//! page limit, repeated cursor). Safety stops end the run successfully with
//! a warning on the summary; exhausted retries and processing errors are
//! hard failures.

pub mod engine;

pub use engine::{collect_all, PaginationError, Paginator};
