#![forbid(unsafe_code)]

//! Source/sink validation done before a run is started.
//!
//! The engine accepts any source and sink and reports zero flow when the
//! sink cannot be reached. Front ends that want a clear message instead run
//! [`precheck`] first.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;
use tracing::debug;

use crate::graph::EdgeStore;
use crate::types::{NodeIndex, NodeKey};

/// Reasons a run should not be started.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PrecheckError {
    /// Source or sink is unset or not in the node sequence.
    #[error("Please set both a source and a sink.")]
    MissingTerminal,
    /// Source and sink are the same node.
    #[error("Source and sink must be different.")]
    SameTerminal,
    /// No directed walk leads from source to sink.
    #[error("No path exists from source to sink.")]
    NoPath,
}

/// Validates the terminals of a run and returns them unwrapped.
///
/// Reachability follows edge direction and ignores capacity, so a graph
/// whose only path has zero capacity passes and runs to a zero flow.
pub fn precheck<G: EdgeStore + ?Sized>(
    graph: &G,
    source: Option<NodeIndex>,
    sink: Option<NodeIndex>,
) -> Result<(NodeIndex, NodeIndex), PrecheckError> {
    let node_count = graph.node_keys().len();
    let (source, sink) = match (source, sink) {
        (Some(s), Some(t)) if s < node_count && t < node_count => (s, t),
        _ => return Err(PrecheckError::MissingTerminal),
    };
    if source == sink {
        return Err(PrecheckError::SameTerminal);
    }
    if !can_reach(graph, source, sink) {
        debug!(source, sink, "precheck.no_path");
        return Err(PrecheckError::NoPath);
    }
    Ok((source, sink))
}

/// Whether `sink` is reachable from `source` along edge directions.
pub fn can_reach<G: EdgeStore + ?Sized>(graph: &G, source: NodeIndex, sink: NodeIndex) -> bool {
    let keys = graph.node_keys();
    let index: HashMap<NodeKey, NodeIndex> =
        keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let mut out: Vec<Vec<NodeIndex>> = vec![Vec::new(); keys.len()];
    for (_, edge) in graph.edges() {
        if let (Some(&u), Some(&v)) = (index.get(&edge.from), index.get(&edge.to)) {
            out[u].push(v);
        }
    }
    if source >= keys.len() {
        return false;
    }

    let mut visited = vec![false; keys.len()];
    let mut queue = VecDeque::from([source]);
    visited[source] = true;
    while let Some(u) = queue.pop_front() {
        if u == sink {
            return true;
        }
        for &v in &out[u] {
            if !visited[v] {
                visited[v] = true;
                queue.push_back(v);
            }
        }
    }
    false
}
