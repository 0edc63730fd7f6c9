#![forbid(unsafe_code)]

//! Identifiers and the crate-wide error type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::precheck::PrecheckError;

/// Position of a node inside the ordered node sequence of a graph snapshot.
pub type NodeIndex = usize;

/// Stable identity of a node owned by the graph-editing side.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NodeKey(pub u64);

/// Stable identity of an edge owned by the graph-editing side.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// Errors surfaced by graph editing, import and playback.
///
/// The engine itself never fails: malformed snapshots degrade to skipped
/// edges or a zero flow. Errors come from the layers around it.
#[derive(thiserror::Error, Debug)]
pub enum DinitzError {
    /// I/O error from a reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parsing error during graph import.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Serialization error from a JSON renderer.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Capacity that is negative, non-finite or not a number.
    #[error("capacity must be a non-negative number, got '{value}'")]
    InvalidCapacity {
        /// Offending input, as written.
        value: String,
    },
    /// Invalid argument or input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Referenced node or edge does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Source/sink validation failed before a run.
    #[error(transparent)]
    Precheck(#[from] PrecheckError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DinitzError>;

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeKey {
    fn from(value: u64) -> Self {
        NodeKey(value)
    }
}

impl From<u64> for EdgeId {
    fn from(value: u64) -> Self {
        EdgeId(value)
    }
}

/// Formats a flow or capacity amount the way edge labels show it:
/// integral values without a fractional part, everything else as-is.
pub fn format_amount(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
