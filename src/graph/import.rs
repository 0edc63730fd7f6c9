//! CSV import of node/edge snapshots.
//!
//! Edges come as rows of `from,to[,capacity][,flow]`; node ids are arbitrary
//! strings. Without a nodes file, nodes are created in order of first
//! appearance in the edges file.

use std::collections::HashMap;
use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use super::{Capacity, Edge, FlowGraph};
use crate::types::{DinitzError, NodeIndex, NodeKey, Result};

/// Column layout and file locations for an import.
#[derive(Debug, Clone)]
pub struct GraphImportConfig {
    /// CSV file with one edge per row.
    pub edges_path: PathBuf,
    /// Optional CSV file fixing node order; one node per row.
    pub nodes_path: Option<PathBuf>,
    /// Node id column in the nodes file.
    pub node_id_column: String,
    /// Edge tail column.
    pub from_column: String,
    /// Edge head column.
    pub to_column: String,
    /// Capacity column; rows without a value get unit capacity.
    pub capacity_column: String,
    /// Initial flow column; rows without a value start at zero.
    pub flow_column: String,
}

impl GraphImportConfig {
    /// Default column names for the given edges file.
    pub fn new(edges_path: impl Into<PathBuf>) -> Self {
        Self {
            edges_path: edges_path.into(),
            nodes_path: None,
            node_id_column: "id".into(),
            from_column: "from".into(),
            to_column: "to".into(),
            capacity_column: "capacity".into(),
            flow_column: "flow".into(),
        }
    }

    /// Sets the nodes file.
    pub fn nodes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.nodes_path = Some(path.into());
        self
    }
}

/// Graph plus the external id of every node.
#[derive(Debug, Clone)]
pub struct ImportedGraph {
    /// The loaded graph.
    pub graph: FlowGraph,
    labels: Vec<String>,
    keys: HashMap<String, NodeKey>,
}

impl ImportedGraph {
    /// External id of the node at `index`.
    pub fn label(&self, index: NodeIndex) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// All external ids, in node order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Node index for an external id.
    pub fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.keys
            .get(label.trim())
            .and_then(|key| self.graph.index_of(*key))
    }
}

/// Loads a graph from CSV.
///
/// Edges naming a node absent from an explicit nodes file are rejected;
/// the engine tolerates dangling edges but an import should not create them.
pub fn load_graph_csv(cfg: &GraphImportConfig) -> Result<ImportedGraph> {
    let mut imported = ImportedGraph {
        graph: FlowGraph::new(),
        labels: Vec::new(),
        keys: HashMap::new(),
    };
    let fixed_nodes = cfg.nodes_path.is_some();
    if let Some(path) = &cfg.nodes_path {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();
        let id_index = find_column(&headers, &cfg.node_id_column)?;
        for result in reader.records() {
            let record = result?;
            let id = get_required(&record, id_index, &cfg.node_id_column)?;
            if imported.keys.contains_key(id) {
                return Err(DinitzError::InvalidArgument(format!(
                    "duplicate node id '{id}' in nodes file"
                )));
            }
            intern(&mut imported, id);
        }
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(&cfg.edges_path)?;
    let headers = reader.headers()?.clone();
    let from_index = find_column(&headers, &cfg.from_column)?;
    let to_index = find_column(&headers, &cfg.to_column)?;
    let capacity_index = find_optional_column(&headers, &cfg.capacity_column);
    let flow_index = find_optional_column(&headers, &cfg.flow_column);

    for result in reader.records() {
        let record = result?;
        let from = get_required(&record, from_index, &cfg.from_column)?;
        let to = get_required(&record, to_index, &cfg.to_column)?;
        let (from, to) = if fixed_nodes {
            let lookup = |id: &str| {
                imported.keys.get(id).copied().ok_or_else(|| {
                    DinitzError::InvalidArgument(format!("edge references unknown node '{id}'"))
                })
            };
            (lookup(from)?, lookup(to)?)
        } else {
            (intern(&mut imported, from), intern(&mut imported, to))
        };

        let capacity = match get_optional(&record, capacity_index) {
            Some(raw) => Capacity::parse(raw)?,
            None => Capacity::UNIT,
        };
        let mut edge = Edge::new(from, to, capacity);
        if let Some(raw) = get_optional(&record, flow_index) {
            let flow: f64 = raw.parse().map_err(|_| {
                DinitzError::InvalidArgument(format!("flow '{raw}' is not a number"))
            })?;
            if !(0.0..=edge.capacity).contains(&flow) {
                return Err(DinitzError::InvalidArgument(format!(
                    "flow {flow} outside 0..={} on edge {from}->{to}",
                    edge.capacity
                )));
            }
            edge.flow = flow;
        }
        imported.graph.insert_edge(edge);
    }

    info!(
        nodes = imported.graph.node_count(),
        edges = imported.graph.edge_count(),
        path = %cfg.edges_path.display(),
        "graph.import"
    );
    Ok(imported)
}

fn intern(imported: &mut ImportedGraph, id: &str) -> NodeKey {
    if let Some(key) = imported.keys.get(id) {
        return *key;
    }
    let key = imported.graph.add_node();
    debug!(id, key = key.0, "graph.import.node");
    imported.labels.push(id.to_string());
    imported.keys.insert(id.to_string(), key);
    key
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_optional_column(headers, name)
        .ok_or_else(|| DinitzError::InvalidArgument(format!("column '{name}' not found")))
}

fn find_optional_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str> {
    get_optional(record, Some(idx))
        .ok_or_else(|| DinitzError::InvalidArgument(format!("missing value for column '{name}'")))
}

fn get_optional(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
