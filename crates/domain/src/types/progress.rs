//! Progress events emitted by the executor and the fan-out

use serde::{Deserialize, Serialize};

use super::zone::ZoneId;

/// Emitted once per completed chunk, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Chunks finished so far
    pub completed_chunks: usize,
    /// Chunks in the run
    pub total_chunks: usize,
    /// Input items in successful chunks so far
    pub successful_count: usize,
}

impl ProgressEvent {
    /// True for the last event of a run
    pub fn is_final(&self) -> bool {
        self.completed_chunks >= self.total_chunks
    }

    /// Completion as a fraction in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total_chunks == 0 {
            return 1.0;
        }
        self.completed_chunks as f64 / self.total_chunks as f64
    }
}

/// Fan-out progress: the zone that just advanced plus totals across zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutProgress {
    /// Zone whose chunk just finished
    pub zone_id: ZoneId,
    /// Chunks finished in that zone
    pub zone_completed: usize,
    /// Chunks in that zone
    pub zone_total: usize,
    /// Chunks finished across all zones
    pub completed_batches: usize,
    /// Chunks across all zones
    pub total_batches: usize,
    /// Zones with every chunk finished
    pub completed_zones: usize,
    /// Zones in the run
    pub total_zones: usize,
    /// Items in successful chunks across all zones
    pub successful_items: usize,
}

impl FanOutProgress {
    /// True for the last event of the fan-out
    pub fn is_final(&self) -> bool {
        self.completed_batches >= self.total_batches
    }
}
