//! Two-level fan-out: zones in parallel, chunks in parallel within a zone
//!
//! Each zone runs its own [`BatchExecutor`] inside a task admitted by a
//! zone-level [`ConcurrencyGate`]. Zone tasks forward their progress to the
//! caller over a channel; the caller turns per-zone counts into run-wide
//! batch totals and folds each finished zone into a [`FanOutResult`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use edgebulk_common::resilience::{ConcurrencyGate, GateConfig};
use edgebulk_domain::{
    ChunkError, ChunkFailure, FanOutConfig, FanOutProgress, FanOutResult, OperationResult,
    ProgressEvent, ZoneId,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::executor::BatchExecutor;
use super::splitter::chunk_count;

enum ZoneMessage<R, E> {
    Progress { zone_id: ZoneId, event: ProgressEvent },
    Finished { zone_id: ZoneId, result: OperationResult<R, E> },
}

/// Per-zone progress bookkeeping held by the aggregator.
#[derive(Debug, Default, Clone, Copy)]
struct ZoneTally {
    completed: usize,
    total: usize,
    successful: usize,
}

/// Runs one [`BatchExecutor`] pass per zone,
/// with a bounded number of zones in flight.
#[derive(Debug, Clone, Default)]
pub struct ZoneFanOut {
    config: FanOutConfig,
}

impl ZoneFanOut {
    /// Fan-out running with `config`.
    pub fn new(config: FanOutConfig) -> Self {
        Self { config }
    }

    /// Zone and per-zone batch settings in use.
    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }

    /// Run `process(zone, chunk)` over every zone's items.
    ///
    /// Zones with no items are skipped. One zone failing entirely has no
    /// effect on the others. `on_progress` runs on the calling task once per
    /// finished chunk in any zone.
    #[instrument(name = "zone_fan_out", skip_all, fields(zones = tracing::field::Empty))]
    pub async fn execute<I, T, R, E, F, Fut, P>(
        &self,
        items_by_zone: I,
        process: F,
        mut on_progress: P,
    ) -> FanOutResult<R, E>
    where
        I: IntoIterator<Item = (ZoneId, Vec<T>)>,
        T: Send + 'static,
        R: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn(ZoneId, Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<R>, E>> + Send + 'static,
        P: FnMut(FanOutProgress),
    {
        let batch_config = self.config.batch.clone();
        let batch_size = batch_config.effective_batch_size();

        let zones = group_by_zone(items_by_zone);
        let mut fan_out = FanOutResult::default();
        if zones.is_empty() {
            debug!("no zone has items");
            return fan_out;
        }

        let total_zones = zones.len();
        let zone_concurrency = self.config.effective_zone_concurrency().min(total_zones);
        tracing::Span::current().record("zones", total_zones);

        let mut tallies: HashMap<ZoneId, ZoneTally> = HashMap::with_capacity(total_zones);
        for (zone_id, items) in &zones {
            let total = chunk_count(items.len(), batch_size);
            tallies.insert(zone_id.clone(), ZoneTally { total, ..ZoneTally::default() });
        }
        let total_batches: usize = tallies.values().map(|t| t.total).sum();
        info!(total_zones, total_batches, zone_concurrency, "starting zone fan-out");

        let gate = ConcurrencyGate::new(GateConfig::new(zone_concurrency));
        let process = Arc::new(process);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (zone_id, items) in zones {
            let gate = gate.clone();
            let process = Arc::clone(&process);
            let executor = BatchExecutor::new(batch_config.clone());
            let tx = tx.clone();

            tokio::spawn(async move {
                let item_count = items.len();
                let progress_tx = tx.clone();
                let progress_zone = zone_id.clone();
                let chunk_zone = zone_id.clone();

                let run = gate
                    .run(|| {
                        executor.execute(
                            items,
                            move |chunk| process(chunk_zone.clone(), chunk),
                            move |event| {
                                let _ = progress_tx.send(ZoneMessage::Progress {
                                    zone_id: progress_zone.clone(),
                                    event,
                                });
                            },
                        )
                    })
                    .await;

                let result = run.unwrap_or_else(|gate_err| {
                    aborted_zone(item_count, batch_size, &gate_err.to_string())
                });
                let _ = tx.send(ZoneMessage::Finished { zone_id, result });
            });
        }
        drop(tx);

        let mut completed_batches = 0;
        let mut completed_zones = 0;
        let mut successful_items = 0;

        while let Some(message) = rx.recv().await {
            match message {
                ZoneMessage::Progress { zone_id, event } => {
                    let tally = tallies.entry(zone_id.clone()).or_default();
                    tally.completed += 1;
                    successful_items += event.successful_count.saturating_sub(tally.successful);
                    tally.successful = event.successful_count;
                    completed_batches += 1;
                    if event.is_final() {
                        completed_zones += 1;
                    }

                    on_progress(FanOutProgress {
                        zone_completed: tally.completed,
                        zone_total: tally.total,
                        completed_batches,
                        total_batches,
                        completed_zones,
                        total_zones,
                        successful_items,
                        zone_id,
                    });
                }
                ZoneMessage::Finished { zone_id, result } => {
                    if result.is_success() {
                        debug!(zone = %zone_id, items = result.total_items, "zone finished");
                    } else {
                        warn!(
                            zone = %zone_id,
                            failed_chunks = result.failed_chunks(),
                            failed_items = result.failed_items,
                            "zone finished with failures"
                        );
                    }
                    fan_out.record_zone(zone_id, result);
                }
            }
        }

        info!(
            succeeded_items = fan_out.succeeded_items(),
            failed_items = fan_out.failed_items(),
            zones_with_errors = fan_out.errors.len(),
            peak_zones_in_flight = gate.metrics().peak_in_flight,
            "zone fan-out finished"
        );
        fan_out
    }
}

/// Merge repeated zones (keeping first-seen order) and drop empty ones.
fn group_by_zone<I, T>(items_by_zone: I) -> Vec<(ZoneId, Vec<T>)>
where
    I: IntoIterator<Item = (ZoneId, Vec<T>)>,
{
    let mut positions: HashMap<ZoneId, usize> = HashMap::new();
    let mut zones: Vec<(ZoneId, Vec<T>)> = Vec::new();

    for (zone_id, items) in items_by_zone {
        if items.is_empty() {
            continue;
        }
        match positions.get(&zone_id) {
            Some(&position) => zones[position].1.extend(items),
            None => {
                positions.insert(zone_id.clone(), zones.len());
                zones.push((zone_id, items));
            }
        }
    }

    zones
}

/// Result for a zone whose task was never admitted: every chunk failed.
fn aborted_zone<R, E>(item_count: usize, batch_size: usize, reason: &str) -> OperationResult<R, E> {
    let total_chunks = chunk_count(item_count, batch_size);
    let errors = (0..total_chunks)
        .map(|chunk_index| ChunkError {
            chunk_index,
            item_count: batch_size.min(item_count - chunk_index * batch_size),
            failure: ChunkFailure::Aborted(reason.to_string()),
        })
        .collect();

    OperationResult {
        errors,
        total_items: item_count,
        total_chunks,
        failed_items: item_count,
        ..OperationResult::empty()
    }
}
