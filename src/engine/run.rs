use std::collections::VecDeque;

use tracing::{debug, info};

use super::blocking::{Augment, Cursors};
use super::level::{build_levels, LevelGraph};
use super::options::RunOptions;
use super::residual::ResidualNetwork;
use crate::graph::EdgeStore;
use crate::step::{PhaseName, Step};
use crate::types::{format_amount, NodeIndex};

struct Phase {
    net: ResidualNetwork,
    levels: LevelGraph,
    cursors: Cursors,
}

enum State {
    StartPhase,
    Blocking(Phase),
    Done,
}

/// One Dinic run over a graph, exposed as a lazy stream of [`Step`]s.
///
/// Work happens only when the consumer pulls: each refill either runs one
/// BFS sweep or one augmenting attempt and buffers the steps it produced.
/// Flow is written to the graph as soon as an attempt succeeds, so a
/// consumer that stops pulling leaves the graph with a valid partial flow.
///
/// The stream cannot be rewound; start a new run to replay.
///
/// ```ignore
/// let mut run = DinitzRun::new(&mut graph, 0, 3);
/// for step in &mut run {
///     println!("{step}");
/// }
/// assert_eq!(run.max_flow(), Some(4.0));
/// ```
pub struct DinitzRun<'g, G: EdgeStore + ?Sized> {
    graph: &'g mut G,
    source: NodeIndex,
    sink: NodeIndex,
    options: RunOptions,
    state: State,
    pending: VecDeque<Step>,
    iteration: u32,
    total: f64,
    max_flow: Option<f64>,
    capped: bool,
}

impl<'g, G: EdgeStore + ?Sized> DinitzRun<'g, G> {
    /// Starts a run with default options.
    pub fn new(graph: &'g mut G, source: NodeIndex, sink: NodeIndex) -> Self {
        Self::with_options(graph, source, sink, RunOptions::default())
    }

    /// Starts a run with explicit options.
    ///
    /// Source and sink are not validated: an out-of-range or unreachable
    /// sink simply ends the run after the first BFS with the flow unchanged.
    pub fn with_options(
        graph: &'g mut G,
        source: NodeIndex,
        sink: NodeIndex,
        options: RunOptions,
    ) -> Self {
        info!(
            nodes = graph.node_keys().len(),
            source, sink, "dinitz.run.start"
        );
        Self {
            graph,
            source,
            sink,
            options,
            state: State::StartPhase,
            pending: VecDeque::new(),
            iteration: 0,
            total: 0.0,
            max_flow: None,
            capped: false,
        }
    }

    /// Phases started so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Flow pushed out of the source so far.
    pub fn total_flow(&self) -> f64 {
        self.total
    }

    /// Final maximum flow, once the stream is exhausted.
    ///
    /// Stays `None` for a run cut short by [`RunOptions::max_phases`]; its
    /// partial flow is [`Self::total_flow`].
    pub fn max_flow(&self) -> Option<f64> {
        self.max_flow
    }

    /// Whether the phase cap ended the run before the flow was maximal.
    pub fn was_capped(&self) -> bool {
        self.capped
    }

    /// Whether the algorithm has terminated. Buffered steps may remain.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// The graph being updated.
    pub fn graph(&self) -> &G {
        &*self.graph
    }

    /// Drains the remaining steps and returns the final flow.
    pub fn run_to_end(mut self) -> f64 {
        for _ in &mut self {}
        self.total
    }

    fn start_phase(&mut self) {
        if let Some(limit) = self.options.max_phases {
            if self.iteration >= limit {
                info!(
                    flow = self.total,
                    phases = self.iteration,
                    "dinitz.run.capped"
                );
                self.pending.push_back(Step::text(format!(
                    "Stopped after {limit} phases. flow = {}",
                    format_amount(self.total)
                )));
                self.capped = true;
                self.state = State::Done;
                return;
            }
        }

        let net = ResidualNetwork::build(&*self.graph);
        if net.skipped_edges() > 0 {
            self.options.metrics.dangling_edges(net.skipped_edges());
        }
        self.iteration += 1;
        self.options.metrics.phase_started();
        debug!(
            iteration = self.iteration,
            arcs = net.arc_count(),
            "dinitz.phase.start"
        );

        let mut sweep = vec![Step::Phase {
            name: PhaseName::Bfs,
            iteration: self.iteration,
        }];
        let (levels, scanned) = build_levels(&net, self.source, &mut sweep);
        self.options.metrics.arcs_scanned(scanned);
        sweep.push(Step::Levels {
            levels: levels.as_slice().to_vec(),
        });
        self.pending.extend(sweep);

        // A source that is its own sink would admit an unbounded push.
        if self.source == self.sink || !levels.reaches(self.sink) {
            self.finish(format!("Done. maxflow = {}", format_amount(self.total)));
            return;
        }

        debug!(
            iteration = self.iteration,
            sink_level = levels.level(self.sink),
            "dinitz.phase.blocking"
        );
        self.pending.push_back(Step::Phase {
            name: PhaseName::BlockingFlow,
            iteration: self.iteration,
        });
        self.state = State::Blocking(Phase {
            cursors: Cursors::new(net.node_count()),
            net,
            levels,
        });
    }

    fn augment_once(&mut self) {
        let State::Blocking(phase) = &mut self.state else {
            return;
        };
        let mut attempt_steps = Vec::new();
        let mut attempt = Augment {
            net: &mut phase.net,
            levels: &phase.levels,
            cursors: &mut phase.cursors,
            graph: &mut *self.graph,
            sink: self.sink,
            out: &mut attempt_steps,
            scanned: 0,
        };
        let pushed = attempt.push_from(self.source, f64::INFINITY);
        let scanned = attempt.scanned;

        self.options.metrics.arcs_scanned(scanned);
        self.pending.extend(attempt_steps);
        if pushed > 0.0 {
            self.total += pushed;
            self.options.metrics.augmented();
            debug!(pushed, total = self.total, "dinitz.augment");
            self.pending.push_back(Step::text(format!(
                "Augment +{}, total={}",
                format_amount(pushed),
                format_amount(self.total)
            )));
        } else {
            self.pending.push_back(Step::ClearHighlights);
            self.state = State::StartPhase;
        }
    }

    fn finish(&mut self, message: String) {
        info!(
            max_flow = self.total,
            phases = self.iteration,
            "dinitz.run.finish"
        );
        self.pending.push_back(Step::text(message));
        self.max_flow = Some(self.total);
        self.state = State::Done;
    }
}

impl<G: EdgeStore + ?Sized> Iterator for DinitzRun<'_, G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            if let Some(step) = self.pending.pop_front() {
                self.options.metrics.step_emitted();
                return Some(step);
            }
            match self.state {
                State::Done => return None,
                State::StartPhase => self.start_phase(),
                State::Blocking(_) => self.augment_once(),
            }
        }
    }
}

/// Runs Dinic to completion, discarding the steps, and returns the maximum
/// flow. Flow is left on the graph's edges.
pub fn run_max_flow<G: EdgeStore + ?Sized>(
    graph: &mut G,
    source: NodeIndex,
    sink: NodeIndex,
) -> f64 {
    DinitzRun::new(graph, source, sink).run_to_end()
}
