//! Outcome of chunked bulk operations
//!
//! A chunk either fully succeeds or fully fails. Every input item is
//! therefore accounted for exactly once: in `succeeded_items` through a
//! successful chunk, or in `failed_items` through a [`ChunkError`].

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::zone::ZoneId;

/// Why a chunk failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ChunkFailure<E> {
    /// The chunk function returned an error
    #[error("{0}")]
    Remote(E),

    /// The chunk function panicked
    #[error("chunk task panicked: {0}")]
    Panicked(String),

    /// The chunk never ran (admission was refused)
    #[error("chunk aborted: {0}")]
    Aborted(String),
}

impl<E> ChunkFailure<E> {
    /// The error returned by the chunk function, if that is why it failed
    pub fn remote(&self) -> Option<&E> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

/// One failed chunk
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("chunk {chunk_index} ({item_count} items) failed: {failure}")]
pub struct ChunkError<E> {
    /// Zero-based index of the chunk
    pub chunk_index: usize,
    /// Items the chunk carried
    pub item_count: usize,
    /// What went wrong
    pub failure: ChunkFailure<E>,
}

/// Aggregated results and errors of one executor run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult<R, E> {
    /// Concatenated results of successful chunks; order within a chunk is
    /// preserved, order across chunks follows completion.
    pub results: Vec<R>,
    /// One entry per failed chunk, in completion order
    pub errors: Vec<ChunkError<E>>,
    /// Items submitted
    pub total_items: usize,
    /// Chunks the items were split into
    pub total_chunks: usize,
    /// Items in successful chunks
    pub succeeded_items: usize,
    /// Items in failed chunks
    pub failed_items: usize,
}

impl<R, E> Default for OperationResult<R, E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R, E> OperationResult<R, E> {
    /// Result of a run over zero items
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            errors: Vec::new(),
            total_items: 0,
            total_chunks: 0,
            succeeded_items: 0,
            failed_items: 0,
        }
    }

    /// True when no chunk failed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed chunks
    pub fn failed_chunks(&self) -> usize {
        self.errors.len()
    }

    /// Items accounted for by successes plus failures; equals `total_items`
    /// for every completed run.
    pub fn accounted_items(&self) -> usize {
        self.succeeded_items + self.failed_items
    }

    /// First `limit` errors ordered by chunk index, for reporting.
    pub fn error_sample(&self, limit: usize) -> Vec<&ChunkError<E>> {
        let mut sample: Vec<&ChunkError<E>> = self.errors.iter().collect();
        sample.sort_by_key(|err| err.chunk_index);
        sample.truncate(limit);
        sample
    }

    /// Summary counts without the payloads
    pub fn outcome(&self) -> ZoneOutcome {
        ZoneOutcome {
            total_items: self.total_items,
            succeeded_items: self.succeeded_items,
            failed_items: self.failed_items,
            total_chunks: self.total_chunks,
            failed_chunks: self.errors.len(),
        }
    }

    /// Split into results and errors
    pub fn into_parts(self) -> (Vec<R>, Vec<ChunkError<E>>) {
        (self.results, self.errors)
    }
}

/// Per-zone summary counts in a fan-out run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneOutcome {
    /// Items submitted for the zone
    pub total_items: usize,
    /// Items in the zone's successful chunks
    pub succeeded_items: usize,
    /// Items in the zone's failed chunks
    pub failed_items: usize,
    /// Chunks the zone's items were split into
    pub total_chunks: usize,
    /// Chunks that failed
    pub failed_chunks: usize,
}

/// Aggregated results of a zone fan-out
///
/// `results` holds only zones with at least one successful chunk, `errors`
/// only zones with at least one failed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutResult<R, E> {
    /// Successful results per zone
    pub results: BTreeMap<ZoneId, Vec<R>>,
    /// Failed chunks per zone
    pub errors: BTreeMap<ZoneId, Vec<ChunkError<E>>>,
    /// Counts for every zone that was run
    pub outcomes: BTreeMap<ZoneId, ZoneOutcome>,
}

impl<R, E> Default for FanOutResult<R, E> {
    fn default() -> Self {
        Self { results: BTreeMap::new(), errors: BTreeMap::new(), outcomes: BTreeMap::new() }
    }
}

impl<R, E> FanOutResult<R, E> {
    /// True when no zone had a failed chunk
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Successful items across all zones
    pub fn succeeded_items(&self) -> usize {
        self.outcomes.values().map(|o| o.succeeded_items).sum()
    }

    /// Failed items across all zones
    pub fn failed_items(&self) -> usize {
        self.outcomes.values().map(|o| o.failed_items).sum()
    }

    /// Fold one zone's executor result into the fan-out maps.
    pub fn record_zone(&mut self, zone_id: ZoneId, result: OperationResult<R, E>) {
        let outcome = result.outcome();
        let (results, errors) = result.into_parts();
        if outcome.total_items > 0 {
            self.outcomes.insert(zone_id.clone(), outcome);
        }
        if outcome.succeeded_items > 0 || !results.is_empty() {
            self.results.entry(zone_id.clone()).or_default().extend(results);
        }
        if !errors.is_empty() {
            self.errors.entry(zone_id).or_default().extend(errors);
        }
    }
}
