use tracing::debug;

use super::{Capacity, Edge, EdgeStore};
use crate::types::{DinitzError, EdgeId, NodeIndex, NodeKey, Result};

/// In-memory graph with stable node keys and edge ids.
///
/// Nodes keep insertion order. Removing a node leaves its incident edges in
/// place; they dangle until removed and residual construction skips them.
///
/// Keys and ids are handed out in increasing order and removals preserve
/// order, so both sequences stay sorted and lookups are binary searches.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    nodes: Vec<NodeKey>,
    edges: Vec<(EdgeId, Edge)>,
    next_node: u64,
    next_edge: u64,
}

impl FlowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its key.
    pub fn add_node(&mut self) -> NodeKey {
        let key = NodeKey(self.next_node);
        self.next_node += 1;
        self.nodes.push(key);
        key
    }

    /// Appends `count` nodes and returns their keys in order.
    pub fn add_nodes(&mut self, count: usize) -> Vec<NodeKey> {
        (0..count).map(|_| self.add_node()).collect()
    }

    /// Removes a node. Later nodes shift down by one index.
    pub fn remove_node(&mut self, key: NodeKey) -> Result<()> {
        let pos = self.index_of(key).ok_or(DinitzError::NotFound("node"))?;
        self.nodes.remove(pos);
        Ok(())
    }

    /// Index of `key` in the node sequence.
    pub fn index_of(&self, key: NodeKey) -> Option<NodeIndex> {
        self.nodes.binary_search(&key).ok()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, dangling ones included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds an edge with unit capacity, as a freshly drawn edge has.
    pub fn add_edge(&mut self, from: NodeKey, to: NodeKey) -> Result<EdgeId> {
        self.add_edge_with_capacity(from, to, Capacity::UNIT)
    }

    /// Adds an edge with the given capacity and zero flow.
    ///
    /// Parallel edges are kept as separate edges.
    pub fn add_edge_with_capacity(
        &mut self,
        from: NodeKey,
        to: NodeKey,
        capacity: Capacity,
    ) -> Result<EdgeId> {
        if self.index_of(from).is_none() || self.index_of(to).is_none() {
            return Err(DinitzError::NotFound("edge endpoint"));
        }
        Ok(self.insert_edge(Edge::new(from, to, capacity)))
    }

    /// Inserts an edge as-is without checking its endpoints.
    ///
    /// Used when replaying a snapshot that may already contain dangling
    /// edges.
    pub fn insert_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.push((id, edge));
        id
    }

    /// Removes an edge and returns it.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let pos = self.edge_position(id).ok_or(DinitzError::NotFound("edge"))?;
        Ok(self.edges.remove(pos).1)
    }

    /// Replaces an edge's capacity. Returns `false` when it was already equal.
    pub fn set_capacity(&mut self, id: EdgeId, capacity: Capacity) -> Result<bool> {
        let edge = self.edge_mut(id)?;
        if edge.capacity == capacity.get() {
            return Ok(false);
        }
        edge.capacity = capacity.get();
        edge.flow = edge.flow.min(edge.capacity);
        Ok(true)
    }

    /// Sets every capacity to one. Returns `false` when nothing changed.
    pub fn set_unit_capacities(&mut self) -> bool {
        if self.edges.iter().all(|(_, e)| e.capacity == 1.0) {
            return false;
        }
        for (_, edge) in &mut self.edges {
            edge.capacity = 1.0;
            edge.flow = edge.flow.min(1.0);
        }
        debug!(edges = self.edges.len(), "graph.unit_capacities");
        true
    }

    /// Zeroes every flow, returning the graph to its editing state.
    pub fn reset_flows(&mut self) {
        for (_, edge) in &mut self.edges {
            edge.flow = 0.0;
        }
    }

    /// Label for an edge; see [`Edge::label`].
    pub fn edge_label(&self, id: EdgeId, show_flow: bool) -> Option<String> {
        self.edge(id).map(|e| e.label(show_flow))
    }

    /// Net flow leaving `key`: outgoing minus incoming.
    pub fn net_outflow(&self, key: NodeKey) -> f64 {
        let mut net = 0.0;
        for (_, e) in &self.edges {
            if e.from == key {
                net += e.flow;
            }
            if e.to == key {
                net -= e.flow;
            }
        }
        net
    }

    fn edge_position(&self, id: EdgeId) -> Option<usize> {
        self.edges.binary_search_by_key(&id, |(eid, _)| *eid).ok()
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        let pos = self.edge_position(id).ok_or(DinitzError::NotFound("edge"))?;
        Ok(&mut self.edges[pos].1)
    }
}

impl EdgeStore for FlowGraph {
    fn node_keys(&self) -> &[NodeKey] {
        &self.nodes
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (EdgeId, &Edge)> + '_> {
        Box::new(self.edges.iter().map(|(id, e)| (*id, e)))
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_position(id).map(|pos| &self.edges[pos].1)
    }

    fn set_flow(&mut self, id: EdgeId, flow: f64) {
        if let Ok(edge) = self.edge_mut(id) {
            edge.flow = flow;
        }
    }
}
