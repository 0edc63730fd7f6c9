use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives counters from a running engine.
///
/// Implementations must be cheap: the engine calls them once per phase,
/// augmenting attempt or emitted step.
pub trait EngineMetrics: Send + Sync {
    /// A new phase started (residual rebuild plus BFS).
    fn phase_started(&self);

    /// An augmenting attempt pushed flow.
    fn augmented(&self);

    /// Arcs examined by one BFS sweep or one DFS attempt.
    fn arcs_scanned(&self, count: usize);

    /// Edges skipped during residual construction because an endpoint was
    /// missing.
    fn dangling_edges(&self, count: usize);

    /// A step was handed to the consumer.
    fn step_emitted(&self);
}

/// Discards every counter.
#[derive(Default)]
pub struct NoopMetrics;

impl EngineMetrics for NoopMetrics {
    fn phase_started(&self) {}
    fn augmented(&self) {}
    fn arcs_scanned(&self, _count: usize) {}
    fn dangling_edges(&self, _count: usize) {}
    fn step_emitted(&self) {}
}

/// Atomic counters, readable while a run is in flight.
#[derive(Default, Debug)]
pub struct CounterMetrics {
    /// Phases started.
    pub phases: AtomicU64,
    /// Successful augmenting attempts.
    pub augmentations: AtomicU64,
    /// Arcs examined across BFS and DFS.
    pub arcs_scanned: AtomicU64,
    /// Dangling edges skipped, summed over phases.
    pub dangling_edges: AtomicU64,
    /// Steps emitted.
    pub steps: AtomicU64,
}

impl EngineMetrics for CounterMetrics {
    fn phase_started(&self) {
        self.phases.fetch_add(1, Ordering::Relaxed);
    }

    fn augmented(&self) {
        self.augmentations.fetch_add(1, Ordering::Relaxed);
    }

    fn arcs_scanned(&self, count: usize) {
        self.arcs_scanned.fetch_add(count as u64, Ordering::Relaxed);
    }

    fn dangling_edges(&self, count: usize) {
        self.dangling_edges.fetch_add(count as u64, Ordering::Relaxed);
    }

    fn step_emitted(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics sink, a shared [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn EngineMetrics> {
    Arc::new(NoopMetrics)
}
