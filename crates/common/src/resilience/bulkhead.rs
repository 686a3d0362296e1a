//! Concurrency gate (bulkhead) for bounding in-flight operations
//!
//! Every operation run through a [`ConcurrencyGate`] first waits for a
//! permit. At most `max_concurrent` operations hold a permit at the same
//! time; the rest queue on the semaphore in FIFO order. Unlike a classic
//! rejecting bulkhead the gate never refuses work, because bulk callers must
//! eventually attempt every item.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::trace;

/// Errors surfaced by the gate itself (never by the wrapped operation)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The underlying semaphore was closed while waiting for admission
    #[error("concurrency gate closed while waiting for admission")]
    Closed,
}

/// Configuration for gate behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Maximum number of operations admitted at the same time
    pub max_concurrent: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { max_concurrent: 10 }
    }
}

impl GateConfig {
    /// Create a configuration admitting `max_concurrent` operations at once.
    ///
    /// Zero is raised to one; a gate that admits nothing would deadlock.
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent: max_concurrent.max(1) }
    }
}

/// Snapshot of gate counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateMetrics {
    /// Total number of operations admitted so far
    pub total_admitted: u64,
    /// Operations currently holding a permit
    pub in_flight: usize,
    /// Highest `in_flight` value observed since creation
    pub peak_in_flight: usize,
    /// Configured admission limit
    pub max_concurrent: usize,
}

/// Semaphore-backed admission control.
///
/// Cloning a gate shares its permits and counters.
///
/// # Examples
///
/// ```rust
/// use edgebulk_common::resilience::{ConcurrencyGate, GateConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gate = ConcurrencyGate::new(GateConfig::new(5));
///
/// let value = gate.run(|| async { 42 }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConcurrencyGate {
    config: GateConfig,
    semaphore: Arc<Semaphore>,
    total_admitted: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter when the admitted operation finishes.
struct InFlightGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ConcurrencyGate {
    /// Create a new gate with the given configuration
    pub fn new(config: GateConfig) -> Self {
        let config = GateConfig::new(config.max_concurrent);
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            total_admitted: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    /// Wait for a permit, then run `operation` while holding it.
    ///
    /// The permit is released when the operation's future completes.
    pub async fn run<F, Fut, T>(&self, operation: F) -> Result<T, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = self.semaphore.acquire().await.map_err(|_| GateError::Closed)?;

        self.total_admitted.fetch_add(1, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::AcqRel);
        let _guard = InFlightGuard { in_flight: &self.in_flight };
        trace!(in_flight = current, max = self.config.max_concurrent, "gate admitted operation");

        Ok(operation().await)
    }

    /// Operations currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Configured admission limit
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    /// Get gate metrics
    pub fn metrics(&self) -> GateMetrics {
        GateMetrics {
            total_admitted: self.total_admitted.load(Ordering::Acquire),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            max_concurrent: self.config.max_concurrent,
        }
    }
}

impl fmt::Debug for ConcurrencyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyGate")
            .field("max_concurrent", &self.config.max_concurrent)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
