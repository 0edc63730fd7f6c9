use std::fmt;
use std::sync::Arc;

use super::metrics::{default_metrics, EngineMetrics};

/// Configuration supplied when starting a [`super::DinitzRun`].
#[derive(Clone)]
pub struct RunOptions {
    /// Stop after this many phases even if the sink is still reachable.
    /// `None` runs to optimality.
    pub max_phases: Option<u32>,
    /// Metrics sink.
    pub metrics: Arc<dyn EngineMetrics>,
}

impl RunOptions {
    /// Options that run to optimality without metrics.
    pub fn new() -> Self {
        Self {
            max_phases: None,
            metrics: default_metrics(),
        }
    }

    /// Caps the number of phases.
    pub fn max_phases(mut self, phases: u32) -> Self {
        self.max_phases = Some(phases);
        self
    }

    /// Sets the metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("max_phases", &self.max_phases)
            .finish_non_exhaustive()
    }
}
