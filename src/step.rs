#![forbid(unsafe_code)]

//! Visualization events emitted while the engine runs.
//!
//! Events carry only what a renderer needs: node indices, edge ids and
//! amounts. They are produced in order, consumed in order and never mutated
//! after emission. The serialized form uses the tag names the browser
//! renderer understands (`phase`, `levels`, `highlightEdge`, ...).

use std::fmt;

use serde::Serialize;

use crate::types::{format_amount, EdgeId, NodeIndex};

/// Which half of a phase is starting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PhaseName {
    /// Level-graph construction.
    #[serde(rename = "BFS")]
    Bfs,
    /// Blocking-flow search.
    #[serde(rename = "DFS blocking flow")]
    BlockingFlow,
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseName::Bfs => "BFS",
            PhaseName::BlockingFlow => "DFS blocking flow",
        })
    }
}

/// Why a node is highlighted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeHighlight {
    /// BFS origin.
    Start,
    /// Dequeued by BFS.
    Pop,
    /// Level assigned for the first time.
    Discover,
}

/// Why an edge is highlighted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeHighlight {
    /// BFS examined the forward arc.
    BfsForward,
    /// BFS examined the reverse arc.
    BfsReverse,
    /// DFS followed the arc.
    Dfs,
}

impl fmt::Display for NodeHighlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeHighlight::Start => "start",
            NodeHighlight::Pop => "pop",
            NodeHighlight::Discover => "discover",
        })
    }
}

impl fmt::Display for EdgeHighlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeHighlight::BfsForward => "bfs-forward",
            EdgeHighlight::BfsReverse => "bfs-reverse",
            EdgeHighlight::Dfs => "dfs",
        })
    }
}

/// One visualization event.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    /// A BFS or DFS half-phase starts.
    Phase {
        /// Half-phase.
        name: PhaseName,
        /// 1-based phase number.
        iteration: u32,
    },
    /// Level assignment computed by the BFS that just finished.
    Levels {
        /// Level per node; `None` for nodes the BFS never reached.
        levels: Vec<Option<u32>>,
    },
    /// Node highlight.
    HighlightNode {
        /// Node index.
        id: NodeIndex,
        /// Reason.
        kind: NodeHighlight,
    },
    /// Edge highlight.
    HighlightEdge {
        /// Owning edge.
        edge: EdgeId,
        /// Reason.
        kind: EdgeHighlight,
    },
    /// Flow on an edge changed after a successful push.
    FlowUpdate {
        /// Edge whose flow changed.
        edge: EdgeId,
        /// Signed change; negative when a reverse arc cancelled flow.
        delta: f64,
        /// Flow after the change.
        flow: f64,
        /// Edge capacity.
        capacity: f64,
    },
    /// Free-form status line.
    Text {
        /// Message.
        message: String,
    },
    /// Drop every highlight; ends a blocking-flow phase.
    ClearHighlights,
}

impl Step {
    pub(crate) fn text(message: impl Into<String>) -> Self {
        Step::Text {
            message: message.into(),
        }
    }

    /// Whether the step changes edge flow.
    pub fn is_flow_update(&self) -> bool {
        matches!(self, Step::FlowUpdate { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Phase { name, iteration } => write!(f, "== {name} (phase {iteration}) =="),
            Step::Levels { levels } => {
                f.write_str("levels: [")?;
                for (i, level) in levels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match level {
                        Some(l) => write!(f, "{l}")?,
                        None => f.write_str("-")?,
                    }
                }
                f.write_str("]")
            }
            Step::HighlightNode { id, kind } => write!(f, "node {id} {kind}"),
            Step::HighlightEdge { edge, kind } => write!(f, "edge {edge} {kind}"),
            Step::FlowUpdate {
                edge,
                delta,
                flow,
                capacity,
            } => {
                let sign = if *delta < 0.0 { "-" } else { "+" };
                write!(
                    f,
                    "edge {edge} flow {} / {} ({sign}{})",
                    format_amount(*flow),
                    format_amount(*capacity),
                    format_amount(delta.abs())
                )
            }
            Step::Text { message } => f.write_str(message),
            Step::ClearHighlights => f.write_str("-- clear --"),
        }
    }
}
