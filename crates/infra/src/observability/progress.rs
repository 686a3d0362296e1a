//! Progress callbacks that report through `tracing`
//!
//! For callers without their own progress renderer. Every event is logged
//! at `debug`; `info` is used when completion crosses a 10% step and for
//! the final event, so large runs stay readable at the default filter.

use edgebulk_domain::{FanOutProgress, ProgressEvent};
use tracing::{debug, info};

/// Completed tenths, `0..=10`.
fn tenth(completed: usize, total: usize) -> usize {
    if total == 0 {
        return 10;
    }
    (completed.min(total) * 10) / total
}

/// Executor progress callback labelled with `label`.
pub fn log_progress(label: impl Into<String>) -> impl FnMut(ProgressEvent) {
    let label = label.into();
    let mut last_tenth = 0;

    move |event: ProgressEvent| {
        let step = tenth(event.completed_chunks, event.total_chunks);
        let percent = (event.fraction() * 100.0).round();

        if step > last_tenth || event.is_final() {
            last_tenth = step;
            info!(
                operation = %label,
                completed = event.completed_chunks,
                total = event.total_chunks,
                successful = event.successful_count,
                percent,
                "progress"
            );
        } else {
            debug!(
                operation = %label,
                completed = event.completed_chunks,
                total = event.total_chunks,
                successful = event.successful_count,
                "progress"
            );
        }
    }
}

/// Fan-out progress callback; zone completions are always logged at `info`.
pub fn log_fan_out_progress(label: impl Into<String>) -> impl FnMut(FanOutProgress) {
    let label = label.into();
    let mut last_tenth = 0;
    let mut zones_done = 0;

    move |event: FanOutProgress| {
        let step = tenth(event.completed_batches, event.total_batches);
        let zone_finished = event.completed_zones > zones_done;
        zones_done = event.completed_zones;

        if zone_finished || step > last_tenth || event.is_final() {
            last_tenth = last_tenth.max(step);
            info!(
                operation = %label,
                zone = %event.zone_id,
                zone_completed = event.zone_completed,
                zone_total = event.zone_total,
                batches = event.completed_batches,
                total_batches = event.total_batches,
                zones = event.completed_zones,
                total_zones = event.total_zones,
                successful = event.successful_items,
                "fan-out progress"
            );
        } else {
            debug!(
                operation = %label,
                zone = %event.zone_id,
                batches = event.completed_batches,
                total_batches = event.total_batches,
                "fan-out progress"
            );
        }
    }
}
