#![forbid(unsafe_code)]

//! Paced, cancellable replay of a step stream.
//!
//! The [`Player`] pulls one step, renders it, then suspends for the
//! configured delay before pulling the next. Everything happens on the
//! caller's task: the engine only advances when the player asks for the
//! next step. Two things stop playback early, both checked at every step
//! boundary:
//!
//! - the shared [`CancelFlag`] being set;
//! - the player's [`RunTicket`] going stale because a newer run began on the
//!   same [`RunGate`].
//!
//! Stopping does not roll anything back. Flow already written to the graph
//! stays there.

mod gate;
mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::DinitzRun;
use crate::graph::EdgeStore;
use crate::step::Step;
use crate::types::Result;

pub use gate::{RunGate, RunTicket};
pub use render::{JsonRenderer, RecordingRenderer, StepRenderer, TextRenderer};

/// A stream of steps whose final value becomes known once it is exhausted.
pub trait StepSource: Iterator<Item = Step> {
    /// Final maximum flow; `None` until the stream has ended, and for a
    /// stream that ended without reaching the maximum.
    fn outcome(&self) -> Option<f64>;

    /// Flow pushed so far.
    fn flow_so_far(&self) -> f64;
}

impl<G: EdgeStore + ?Sized> StepSource for DinitzRun<'_, G> {
    fn outcome(&self) -> Option<f64> {
        self.max_flow()
    }

    fn flow_so_far(&self) -> f64 {
        self.total_flow()
    }
}

/// Pacing configuration.
#[derive(Clone, Debug, Default)]
pub struct PlaybackOptions {
    /// Pause after every step.
    pub delay: Duration,
    /// Extra pause after a phase ends (`clearHighlights`).
    pub phase_pause: Duration,
}

impl PlaybackOptions {
    /// Options with the given per-step delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Sets the extra pause after each phase.
    pub fn phase_pause(mut self, pause: Duration) -> Self {
        self.phase_pause = pause;
        self
    }
}

/// Shared cooperative cancellation flag. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; takes effect at the next step boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a playback ended.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// The stream was drained.
    Completed {
        /// Final maximum flow.
        max_flow: f64,
        /// Steps rendered.
        steps: usize,
    },
    /// The stream ended before the flow was maximal, e.g. on a phase cap.
    Stopped {
        /// Flow pushed before the stream ended.
        flow: f64,
        /// Steps rendered.
        steps: usize,
    },
    /// The cancel flag was set.
    Cancelled {
        /// Steps rendered before stopping.
        steps: usize,
    },
    /// A newer run took over the gate.
    Superseded {
        /// Steps rendered before stopping.
        steps: usize,
    },
}

impl PlaybackOutcome {
    /// Steps rendered.
    pub fn steps(&self) -> usize {
        match *self {
            PlaybackOutcome::Completed { steps, .. }
            | PlaybackOutcome::Stopped { steps, .. }
            | PlaybackOutcome::Cancelled { steps }
            | PlaybackOutcome::Superseded { steps } => steps,
        }
    }
}

/// Single-threaded step player.
#[derive(Clone, Debug, Default)]
pub struct Player {
    options: PlaybackOptions,
    cancel: CancelFlag,
    ticket: Option<RunTicket>,
}

impl Player {
    /// Creates a player with its own cancel flag and no run gate.
    pub fn new(options: PlaybackOptions) -> Self {
        Self {
            options,
            cancel: CancelFlag::new(),
            ticket: None,
        }
    }

    /// Uses an externally shared cancel flag.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ties playback to a run ticket; playback stops once it goes stale.
    pub fn with_ticket(mut self, ticket: RunTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }

    /// Handle for cancelling this player.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Plays `source` into `renderer` until it ends or playback is stopped.
    ///
    /// Renderer errors abort playback and are returned. The run ticket is
    /// released however playback ends, including when the future is dropped;
    /// a superseded ticket is stale, so the gate stays with the newer run.
    pub async fn play<S, R>(&self, source: &mut S, renderer: &mut R) -> Result<PlaybackOutcome>
    where
        S: StepSource + ?Sized,
        R: StepRenderer + ?Sized,
    {
        let _release = TicketRelease(self.ticket.as_ref());
        let mut steps = 0usize;
        let outcome = loop {
            if self.cancel.is_cancelled() {
                info!(steps, "playback.cancelled");
                break PlaybackOutcome::Cancelled { steps };
            }
            if let Some(ticket) = &self.ticket {
                if !ticket.is_current() {
                    info!(steps, generation = ticket.generation(), "playback.superseded");
                    break PlaybackOutcome::Superseded { steps };
                }
            }
            let Some(step) = source.next() else {
                if let Some(max_flow) = source.outcome() {
                    debug!(steps, max_flow, "playback.completed");
                    break PlaybackOutcome::Completed { max_flow, steps };
                }
                let flow = source.flow_so_far();
                info!(steps, flow, "playback.stopped");
                break PlaybackOutcome::Stopped { flow, steps };
            };
            renderer.render(&step)?;
            steps += 1;

            let mut pause = self.options.delay;
            if matches!(step, Step::ClearHighlights) {
                pause += self.options.phase_pause;
            }
            suspend(pause).await;
        };
        renderer.flush()?;
        Ok(outcome)
    }
}

/// Finishes the player's ticket when playback exits by any path.
struct TicketRelease<'a>(Option<&'a RunTicket>);

impl Drop for TicketRelease<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.0 {
            ticket.clone().finish();
        }
    }
}

async fn suspend(pause: Duration) {
    if pause.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(pause).await;
    }
}
