use std::collections::VecDeque;

use tracing::trace;

use super::residual::{Orientation, ResidualNetwork};
use crate::step::{EdgeHighlight, NodeHighlight, Step};
use crate::types::NodeIndex;

/// BFS distance from the source over positive-residual arcs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelGraph {
    levels: Vec<Option<u32>>,
}

impl LevelGraph {
    /// Level of `node`, `None` when unreached or out of range.
    pub fn level(&self, node: NodeIndex) -> Option<u32> {
        self.levels.get(node).copied().flatten()
    }

    /// Whether BFS reached `node`.
    pub fn reaches(&self, node: NodeIndex) -> bool {
        self.level(node).is_some()
    }

    /// Whether an arc `from -> to` advances exactly one level.
    pub fn admits(&self, from: NodeIndex, to: NodeIndex) -> bool {
        match (self.level(from), self.level(to)) {
            (Some(a), Some(b)) => b == a + 1,
            _ => false,
        }
    }

    /// Level per node.
    pub fn as_slice(&self) -> &[Option<u32>] {
        &self.levels
    }
}

/// Runs BFS from `source`, pushing visualization steps into `out`.
///
/// Returns the level assignment and the number of arcs examined. Ties are
/// broken by queue order, so the result is fixed for a fixed arc order. An
/// out-of-range source reaches nothing and emits nothing.
pub fn build_levels(
    net: &ResidualNetwork,
    source: NodeIndex,
    out: &mut Vec<Step>,
) -> (LevelGraph, usize) {
    let mut levels = vec![None; net.node_count()];
    let mut scanned = 0;
    if source >= levels.len() {
        return (LevelGraph { levels }, scanned);
    }

    let mut queue = VecDeque::new();
    levels[source] = Some(0);
    queue.push_back(source);
    out.push(Step::HighlightNode {
        id: source,
        kind: NodeHighlight::Start,
    });

    while let Some(u) = queue.pop_front() {
        out.push(Step::HighlightNode {
            id: u,
            kind: NodeHighlight::Pop,
        });
        let next_level = levels[u].map_or(0, |l| l + 1);
        for arc in net.arcs(u) {
            if arc.residual <= 0.0 {
                continue;
            }
            scanned += 1;
            let kind = match arc.orientation {
                Orientation::Forward => EdgeHighlight::BfsForward,
                Orientation::Reverse => EdgeHighlight::BfsReverse,
            };
            out.push(Step::HighlightEdge {
                edge: arc.edge,
                kind,
            });
            if levels[arc.to].is_none() {
                levels[arc.to] = Some(next_level);
                queue.push_back(arc.to);
                trace!(node = arc.to, level = next_level, "bfs.discover");
                out.push(Step::HighlightNode {
                    id: arc.to,
                    kind: NodeHighlight::Discover,
                });
            }
        }
    }

    (LevelGraph { levels }, scanned)
}
