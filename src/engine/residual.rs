use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::graph::EdgeStore;
use crate::types::{EdgeId, NodeIndex, NodeKey};

/// Which way a residual arc runs relative to its owning edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Along the edge; residual is `capacity - flow`.
    Forward,
    /// Against the edge; residual is `flow`, pushing cancels flow.
    Reverse,
}

impl Orientation {
    /// Multiplier applied to a push before it reaches the edge's flow.
    pub fn sign(self) -> f64 {
        match self {
            Orientation::Forward => 1.0,
            Orientation::Reverse => -1.0,
        }
    }
}

/// One direction of an edge inside the residual network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResidualArc {
    /// Head of the arc.
    pub to: NodeIndex,
    /// Position of the complementary arc in `to`'s arc list.
    pub rev: usize,
    /// Remaining capacity along this arc.
    pub residual: f64,
    /// Edge whose flow this arc reads and writes.
    pub edge: EdgeId,
    /// Direction relative to `edge`.
    pub orientation: Orientation,
}

/// Per-node residual arc lists for one phase.
///
/// Built from scratch every phase and dropped at phase end. Every edge with
/// both endpoints present contributes a forward and a reverse arc whose
/// residuals always sum to the edge capacity.
#[derive(Clone, Debug, Default)]
pub struct ResidualNetwork {
    adj: Vec<Vec<ResidualArc>>,
    skipped: usize,
}

impl ResidualNetwork {
    /// Builds the network from the store's current flows. O(V + E).
    pub fn build<G: EdgeStore + ?Sized>(graph: &G) -> Self {
        let keys = graph.node_keys();
        let index: HashMap<NodeKey, NodeIndex> =
            keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        let mut net = ResidualNetwork {
            adj: vec![Vec::new(); keys.len()],
            skipped: 0,
        };
        for (id, edge) in graph.edges() {
            let (Some(&u), Some(&v)) = (index.get(&edge.from), index.get(&edge.to)) else {
                net.skipped += 1;
                continue;
            };
            net.add_edge(u, v, id, edge.capacity - edge.flow, edge.flow);
        }
        if net.skipped > 0 {
            warn!(skipped = net.skipped, "residual.dangling_edges");
        }
        net
    }

    fn add_edge(&mut self, u: NodeIndex, v: NodeIndex, edge: EdgeId, fwd: f64, rev: f64) {
        // A self-loop puts both arcs in the same list; the reverse arc lands
        // one slot after the forward one.
        let fwd_pos = self.adj[u].len();
        let rev_pos = self.adj[v].len() + usize::from(u == v);
        self.adj[u].push(ResidualArc {
            to: v,
            rev: rev_pos,
            residual: fwd,
            edge,
            orientation: Orientation::Forward,
        });
        self.adj[v].push(ResidualArc {
            to: u,
            rev: fwd_pos,
            residual: rev,
            edge,
            orientation: Orientation::Reverse,
        });
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Arcs leaving `node`; empty when out of range.
    pub fn arcs(&self, node: NodeIndex) -> &[ResidualArc] {
        self.adj.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of arcs (twice the number of usable edges).
    pub fn arc_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    /// Edges dropped because an endpoint was missing.
    pub fn skipped_edges(&self) -> usize {
        self.skipped
    }

    /// Moves `amount` along arc `slot` of `node` and credits the complement.
    pub fn push(&mut self, node: NodeIndex, slot: usize, amount: f64) -> ResidualArc {
        let arc = &mut self.adj[node][slot];
        arc.residual -= amount;
        let pushed = *arc;
        self.adj[pushed.to][pushed.rev].residual += amount;
        pushed
    }
}
