use tracing::{trace, warn};

use super::level::LevelGraph;
use super::residual::ResidualNetwork;
use crate::graph::EdgeStore;
use crate::step::{EdgeHighlight, Step};
use crate::types::{EdgeId, NodeIndex};

/// Current-arc pointers for one phase.
///
/// A cursor only moves forward: an arc it has passed is saturated or leads
/// to a dead end for the rest of the phase. This keeps the total arc work of
/// all augmenting attempts in one phase at O(E).
#[derive(Clone, Debug, Default)]
pub struct Cursors {
    next: Vec<usize>,
}

impl Cursors {
    /// Fresh cursors at the first arc of every node.
    pub fn new(node_count: usize) -> Self {
        Self {
            next: vec![0; node_count],
        }
    }

    /// Current arc slot of `node`.
    pub fn get(&self, node: NodeIndex) -> usize {
        self.next.get(node).copied().unwrap_or(0)
    }
}

/// State shared by one augmenting attempt.
pub struct Augment<'a, G: EdgeStore + ?Sized> {
    /// Residual network of the current phase.
    pub net: &'a mut ResidualNetwork,
    /// Levels of the current phase.
    pub levels: &'a LevelGraph,
    /// Current-arc pointers of the current phase.
    pub cursors: &'a mut Cursors,
    /// Owner of the edges being updated.
    pub graph: &'a mut G,
    /// Sink of the run.
    pub sink: NodeIndex,
    /// Visualization buffer for this attempt.
    pub out: &'a mut Vec<Step>,
    /// Arcs examined so far.
    pub scanned: usize,
}

impl<G: EdgeStore + ?Sized> Augment<'_, G> {
    /// Pushes up to `limit` from `u` towards the sink along admissible arcs.
    ///
    /// Returns the amount pushed; zero means no augmenting path is left from
    /// `u` in this level graph. The search keeps its path on the heap, so
    /// path length is bounded by memory rather than stack depth. Flow updates
    /// are applied and recorded in `out` sink-side first.
    pub fn push_from(&mut self, u: NodeIndex, limit: f64) -> f64 {
        let mut path: Vec<(NodeIndex, usize)> = Vec::new();
        let mut bottleneck = vec![limit];
        let mut node = u;
        loop {
            if node == self.sink {
                let pushed = bottleneck[path.len()];
                self.apply(&path, pushed);
                return pushed;
            }
            match self.advance(node) {
                Some(slot) => {
                    let arc = self.net.arcs(node)[slot];
                    self.scanned += 1;
                    self.out.push(Step::HighlightEdge {
                        edge: arc.edge,
                        kind: EdgeHighlight::Dfs,
                    });
                    let reach = bottleneck[path.len()].min(arc.residual);
                    path.push((node, slot));
                    bottleneck.push(reach);
                    node = arc.to;
                }
                None => {
                    // Dead end: retreat and retire the arc that led here.
                    let Some((parent, _)) = path.pop() else {
                        return 0.0;
                    };
                    bottleneck.pop();
                    if let Some(next) = self.cursors.next.get_mut(parent) {
                        *next += 1;
                    }
                    node = parent;
                }
            }
        }
    }

    /// Moves `node`'s cursor to its next admissible arc.
    fn advance(&mut self, node: NodeIndex) -> Option<usize> {
        let arcs = self.net.arcs(node);
        let cursor = self.cursors.next.get_mut(node)?;
        while *cursor < arcs.len() {
            let arc = &arcs[*cursor];
            if arc.residual > 0.0 && self.levels.admits(node, arc.to) {
                return Some(*cursor);
            }
            *cursor += 1;
        }
        None
    }

    fn apply(&mut self, path: &[(NodeIndex, usize)], pushed: f64) {
        for &(node, slot) in path.iter().rev() {
            let arc = self.net.push(node, slot, pushed);
            self.write_flow(arc.edge, pushed * arc.orientation.sign());
        }
    }

    fn write_flow(&mut self, edge: EdgeId, delta: f64) {
        let Some(current) = self.graph.edge(edge).copied() else {
            return;
        };
        let raw = current.flow + delta;
        let flow = raw.clamp(0.0, current.capacity);
        if (raw - flow).abs() > CLAMP_TOLERANCE * current.capacity.max(1.0) {
            warn!(%edge, raw, flow, "dfs.flow_clamped");
        }
        self.graph.set_flow(edge, flow);
        trace!(%edge, delta, flow, "dfs.flow_update");
        self.out.push(Step::FlowUpdate {
            edge,
            delta,
            flow,
            capacity: current.capacity,
        });
    }
}

/// Relative overshoot tolerated as float rounding when writing flow back.
const CLAMP_TOLERANCE: f64 = 1e-9;
