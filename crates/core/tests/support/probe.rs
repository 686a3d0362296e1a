use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tracks how many chunk calls are running at once.
#[derive(Clone, Default)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

/// Decrements the probe's in-flight count when dropped.
pub struct ProbeGuard {
    current: Arc<AtomicUsize>,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyProbe {
    pub fn enter(&self) -> ProbeGuard {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ProbeGuard { current: Arc::clone(&self.current) }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}
