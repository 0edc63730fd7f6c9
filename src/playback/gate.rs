use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

#[derive(Default, Debug)]
struct GateInner {
    generation: AtomicU64,
    running: AtomicBool,
}

/// Hands out run tickets; a newer ticket invalidates every older one.
///
/// Cloning shares the same gate.
#[derive(Clone, Default, Debug)]
pub struct RunGate {
    inner: Arc<GateInner>,
}

impl RunGate {
    /// Creates a gate with no run in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run, superseding the current one if any.
    pub fn begin(&self) -> RunTicket {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let superseded = self.inner.running.swap(true, Ordering::AcqRel);
        debug!(generation, superseded, "playback.run.begin");
        RunTicket {
            generation,
            gate: self.clone(),
        }
    }

    /// Whether the latest run has not finished yet.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Generation of the latest ticket.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }
}

/// Proof of being the latest run of a [`RunGate`].
#[derive(Clone, Debug)]
pub struct RunTicket {
    generation: u64,
    gate: RunGate,
}

impl RunTicket {
    /// Whether no newer run has started since this ticket was issued.
    pub fn is_current(&self) -> bool {
        self.gate.generation() == self.generation
    }

    /// Generation number of this ticket.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the run finished. Stale tickets leave the gate untouched.
    pub fn finish(self) {
        if self.is_current() {
            self.gate.inner.running.store(false, Ordering::Release);
        }
    }
}
