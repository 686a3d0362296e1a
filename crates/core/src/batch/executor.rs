//! Bounded-parallelism chunk executor
//!
//! Items are split into chunks and every chunk runs as its own tokio task.
//! Tasks wait on a [`ConcurrencyGate`] sized to the effective concurrency,
//! call the chunk function once, and report back over an unbounded channel.
//! The calling task is the only place results are aggregated and the only
//! place the progress callback runs.
//!
//! A failed chunk never cancels its siblings: the run always attempts every
//! chunk and returns one [`ChunkError`] per failure.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use edgebulk_common::resilience::{ConcurrencyGate, GateConfig};
use edgebulk_domain::{BatchConfig, ChunkError, ChunkFailure, OperationResult, ProgressEvent};
use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn, Span};

use super::splitter::{split, Chunk};

/// What a chunk task sends back to the aggregator.
struct ChunkReport<R, E> {
    index: usize,
    item_count: usize,
    outcome: Result<Vec<R>, ChunkFailure<E>>,
}

/// Runs chunk functions with bounded parallelism.
///
/// # Examples
///
/// ```rust
/// use edgebulk_core::batch::BatchExecutor;
/// use edgebulk_domain::BatchConfig;
///
/// # async fn example() {
/// let executor = BatchExecutor::new(BatchConfig::new(2, 4));
/// let result = executor
///     .execute(
///         vec![1, 2, 3, 4, 5],
///         |chunk: Vec<i32>| async move { Ok::<_, String>(chunk.iter().map(|n| n * 10).collect()) },
///         |_progress| {},
///     )
///     .await;
/// assert_eq!(result.succeeded_items, 5);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchExecutor {
    config: BatchConfig,
}

impl BatchExecutor {
    /// Executor running with `config`.
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Chunking and concurrency settings in use.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Split `items` into chunks and run `process` once per chunk.
    ///
    /// At most `min(effective_concurrency, chunk count)` chunks are in flight.
    /// `on_progress` is called once per finished chunk, in completion order.
    /// Zero items return immediately without spawning anything.
    #[instrument(
        name = "batch_execute",
        skip_all,
        fields(
            total_items = items.len(),
            total_chunks = tracing::field::Empty,
            concurrency = tracing::field::Empty,
        )
    )]
    pub async fn execute<T, R, E, F, Fut, P>(
        &self,
        items: Vec<T>,
        process: F,
        mut on_progress: P,
    ) -> OperationResult<R, E>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<R>, E>> + Send + 'static,
        P: FnMut(ProgressEvent),
    {
        let total_items = items.len();
        if total_items == 0 {
            debug!("no items to process");
            return OperationResult::empty();
        }

        let chunks = split(items, self.config.effective_batch_size());
        let total_chunks = chunks.len();
        let concurrency = self.config.effective_concurrency().min(total_chunks);
        Span::current().record("total_chunks", total_chunks).record("concurrency", concurrency);
        info!(total_items, total_chunks, concurrency, "starting batch run");

        let gate = ConcurrencyGate::new(GateConfig::new(concurrency));
        let process = Arc::new(process);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut chunk_sizes = Vec::with_capacity(total_chunks);

        for chunk in chunks {
            chunk_sizes.push(chunk.len());
            tokio::spawn(run_chunk(chunk, gate.clone(), Arc::clone(&process), tx.clone()));
        }
        drop(tx);

        let mut result = OperationResult { total_items, total_chunks, ..OperationResult::empty() };
        let mut reported = vec![false; total_chunks];
        let mut completed = 0;

        while let Some(report) = rx.recv().await {
            let ChunkReport { index, item_count, outcome } = report;
            reported[index] = true;
            completed += 1;
            record_outcome(&mut result, index, item_count, outcome);
            on_progress(ProgressEvent {
                completed_chunks: completed,
                total_chunks,
                successful_count: result.succeeded_items,
            });
        }

        // A task that died without reporting still owes an entry.
        for (index, item_count) in chunk_sizes.into_iter().enumerate() {
            if reported[index] {
                continue;
            }
            completed += 1;
            record_outcome(
                &mut result,
                index,
                item_count,
                Err(ChunkFailure::Aborted("chunk task exited without reporting".to_string())),
            );
            on_progress(ProgressEvent {
                completed_chunks: completed,
                total_chunks,
                successful_count: result.succeeded_items,
            });
        }

        info!(
            succeeded_items = result.succeeded_items,
            failed_items = result.failed_items,
            failed_chunks = result.errors.len(),
            peak_in_flight = gate.metrics().peak_in_flight,
            "batch run finished"
        );
        result
    }
}

async fn run_chunk<T, R, E, F, Fut>(
    chunk: Chunk<T>,
    gate: ConcurrencyGate,
    process: Arc<F>,
    tx: mpsc::UnboundedSender<ChunkReport<R, E>>,
) where
    F: Fn(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<R>, E>>,
{
    let Chunk { index, items } = chunk;
    let item_count = items.len();

    let admitted =
        gate.run(|| AssertUnwindSafe(async move { process(items).await }).catch_unwind()).await;

    let outcome = match admitted {
        Ok(Ok(Ok(results))) => Ok(results),
        Ok(Ok(Err(err))) => Err(ChunkFailure::Remote(err)),
        Ok(Err(panic)) => Err(ChunkFailure::Panicked(panic_message(panic.as_ref()))),
        Err(gate_err) => Err(ChunkFailure::Aborted(gate_err.to_string())),
    };

    // The receiver only goes away if the caller's future was dropped.
    let _ = tx.send(ChunkReport { index, item_count, outcome });
}

fn record_outcome<R, E: fmt::Display>(
    result: &mut OperationResult<R, E>,
    index: usize,
    item_count: usize,
    outcome: Result<Vec<R>, ChunkFailure<E>>,
) {
    match outcome {
        Ok(results) => {
            debug!(chunk_index = index, item_count, "chunk succeeded");
            result.succeeded_items += item_count;
            result.results.extend(results);
        }
        Err(failure) => {
            warn!(chunk_index = index, item_count, error = %failure, "chunk failed");
            result.failed_items += item_count;
            result.errors.push(ChunkError { chunk_index: index, item_count, failure });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn empty_input_spawns_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut events = Vec::new();

        let result: OperationResult<u32, String> = BatchExecutor::default()
            .execute(
                Vec::<u32>::new(),
                move |chunk| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(chunk) }
                },
                |event| events.push(event),
            )
            .await;

        assert_eq!(result, OperationResult::empty());
        assert!(events.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_chunk_does_not_cancel_siblings() {
        let executor = BatchExecutor::new(BatchConfig::new(2, 3));

        let result = executor
            .execute(
                (0..7).collect::<Vec<u32>>(),
                |chunk| async move {
                    if chunk.contains(&2) {
                        Err(format!("rejected {chunk:?}"))
                    } else {
                        Ok(chunk)
                    }
                },
                |_| {},
            )
            .await;

        assert_eq!(result.total_chunks, 4);
        assert_eq!(result.succeeded_items, 5);
        assert_eq!(result.failed_items, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].chunk_index, 1);
        assert_eq!(result.errors[0].failure, ChunkFailure::Remote("rejected [2, 3]".to_string()));

        let mut values = result.results.clone();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 4, 5, 6]);
    }

    #[tokio::test]
    async fn panicking_chunk_is_recorded() {
        let executor = BatchExecutor::new(BatchConfig::new(1, 2));

        let result: OperationResult<u32, String> = executor
            .execute(
                vec![1u32, 2, 3],
                |chunk: Vec<u32>| async move {
                    assert!(chunk[0] != 2, "bad item");
                    Ok(chunk)
                },
                |_| {},
            )
            .await;

        assert_eq!(result.succeeded_items, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].chunk_index, 1);
        assert!(matches!(
            &result.errors[0].failure,
            ChunkFailure::Panicked(message) if message.contains("bad item")
        ));
        assert_eq!(result.accounted_items(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn in_flight_never_exceeds_chunk_count() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (current_c, peak_c) = (Arc::clone(&current), Arc::clone(&peak));

        let executor = BatchExecutor::new(BatchConfig::new(10, 20));
        let result: OperationResult<(), String> = executor
            .execute(
                vec![(); 30],
                move |_chunk| {
                    let current = Arc::clone(&current_c);
                    let peak = Arc::clone(&peak_c);
                    async move {
                        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        current.fetch_sub(1, Ordering::SeqCst);
                        Ok(Vec::new())
                    }
                },
                |_| {},
            )
            .await;

        assert!(result.is_success());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
