use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{format_amount, DinitzError, NodeKey, Result};

/// Directed edge as the graph-editing side stores it.
///
/// The engine reads every field but only ever writes `flow`, and only
/// through [`super::EdgeStore::set_flow`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Tail node.
    pub from: NodeKey,
    /// Head node.
    pub to: NodeKey,
    /// Upper bound on `flow`; non-negative and finite.
    pub capacity: f64,
    /// Current flow, kept within `0..=capacity`.
    pub flow: f64,
}

impl Edge {
    /// Creates an edge with zero flow.
    pub fn new(from: NodeKey, to: NodeKey, capacity: Capacity) -> Self {
        Self {
            from,
            to,
            capacity: capacity.get(),
            flow: 0.0,
        }
    }

    /// Remaining capacity in the edge's own direction.
    pub fn slack(&self) -> f64 {
        self.capacity - self.flow
    }

    /// Label text: `"flow / cap"` while a run is shown, `"cap"` while editing.
    pub fn label(&self, show_flow: bool) -> String {
        if show_flow {
            format!(
                "{} / {}",
                format_amount(self.flow),
                format_amount(self.capacity)
            )
        } else {
            format_amount(self.capacity)
        }
    }
}

/// Validated edge capacity: finite and non-negative.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Capacity(f64);

impl Capacity {
    /// Capacity of a freshly drawn edge.
    pub const UNIT: Capacity = Capacity(1.0);

    /// Validates a raw value.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            // Normalizes -0.0.
            Ok(Capacity(value + 0.0))
        } else {
            Err(DinitzError::InvalidCapacity {
                value: value.to_string(),
            })
        }
    }

    /// Parses user text; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let value: f64 = trimmed.parse().map_err(|_| DinitzError::InvalidCapacity {
            value: trimmed.to_string(),
        })?;
        Self::new(value).map_err(|_| DinitzError::InvalidCapacity {
            value: trimmed.to_string(),
        })
    }

    /// Raw value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::UNIT
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}
