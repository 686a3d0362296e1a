//! Cursor pagination types

use std::time::Duration;

use edgebulk_common::utils::serde::duration_millis;
use serde::{Deserialize, Serialize};

/// One fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in source order
    pub items: Vec<T>,
    /// Cursor for the next page; empty means there is none
    pub next_cursor: String,
    /// Set when the source reports the listing finished regardless of cursor
    #[serde(default)]
    pub is_complete: bool,
}

impl<T> Page<T> {
    /// Page followed by `next_cursor`
    pub fn new(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self { items, next_cursor: next_cursor.into(), is_complete: false }
    }

    /// Final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_cursor: String::new(), is_complete: true }
    }
}

/// Why a pagination run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The source flagged the listing complete
    Completed,
    /// A page came back without a next cursor
    CursorExhausted,
    /// The run's time budget ran out
    TimedOut,
    /// The configured page limit was hit
    PageLimitReached,
    /// The source handed back a cursor already seen in this run
    CursorLoop {
        /// The repeated cursor
        cursor: String,
    },
}

impl StopReason {
    /// Safety stops return partial but valid results with a warning.
    pub fn is_safety_stop(&self) -> bool {
        matches!(self, Self::TimedOut | Self::PageLimitReached | Self::CursorLoop { .. })
    }
}

/// Summary of a finished pagination run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSummary {
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Items handed to the page processor
    pub items_processed: usize,
    /// Fetch retries across all pages
    pub retries: u32,
    /// Wall-clock time of the whole run
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    /// Why the run ended
    pub stop_reason: StopReason,
}

impl PaginationSummary {
    /// Human-readable note for safety stops; `None` for a normal end
    pub fn warning(&self) -> Option<String> {
        match &self.stop_reason {
            StopReason::Completed | StopReason::CursorExhausted => None,
            StopReason::TimedOut => Some(format!(
                "pagination timed out after {:?} ({} pages, {} items); results are partial",
                self.elapsed, self.pages_fetched, self.items_processed
            )),
            StopReason::PageLimitReached => Some(format!(
                "page limit reached after {} pages ({} items); results may be partial",
                self.pages_fetched, self.items_processed
            )),
            StopReason::CursorLoop { cursor } => Some(format!(
                "cursor '{}' was returned twice after {} pages; stopping to avoid an infinite loop",
                cursor, self.pages_fetched
            )),
        }
    }
}
