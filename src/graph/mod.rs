#![forbid(unsafe_code)]

//! Graph model owned by the editing side.
//!
//! The engine never owns nodes or edges. It reads a snapshot through
//! [`EdgeStore`] at the start of every phase and writes flow back through
//! [`EdgeStore::set_flow`], so whoever renders the graph observes updates on
//! the same edge identities it handed in.
//!
//! [`FlowGraph`] is the in-memory owner used by the CLI and the tests;
//! [`import`] builds one from CSV files.

mod edge;
mod flow_graph;
pub mod import;

pub use edge::{Capacity, Edge};
pub use flow_graph::FlowGraph;
pub use import::{load_graph_csv, GraphImportConfig, ImportedGraph};

use crate::types::{EdgeId, NodeKey};

/// Read access to a node/edge snapshot plus a single write path for flow.
pub trait EdgeStore {
    /// Ordered node sequence; a node's index is its position here.
    fn node_keys(&self) -> &[NodeKey];

    /// Edges in a stable order. Endpoints may name nodes that are no longer
    /// present; consumers skip those edges.
    fn edges(&self) -> Box<dyn Iterator<Item = (EdgeId, &Edge)> + '_>;

    /// Looks up one edge.
    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    /// Stores a new flow value. Unknown ids are ignored.
    fn set_flow(&mut self, id: EdgeId, flow: f64);
}
