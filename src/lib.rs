//! Dinic's maximum-flow algorithm as a replayable stream of visualization
//! steps.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  snapshot / set_flow  ┌──────────────────────────────┐
//! │ graph        │ ◀──────────────────── │ engine                       │
//! │ (EdgeStore)  │                       │ residual → BFS → blocking DFS │
//! └──────────────┘                       └──────────────┬───────────────┘
//!                                                       │ Step stream
//!                                        ┌──────────────▼───────────────┐
//!                                        │ playback (Player, renderers) │
//!                                        └──────────────────────────────┘
//! ```
//!
//! - [`graph`] - node/edge model owned by the editing side, CSV import
//! - [`engine`] - residual network, level graph, blocking flow, phase loop
//! - [`step`] - the visualization event protocol
//! - [`playback`] - paced, cancellable replay into a renderer
//! - [`precheck`] - source/sink validation for front ends
//!
//! # Example
//!
//! ```ignore
//! use dinitz::engine::DinitzRun;
//! use dinitz::graph::{Capacity, FlowGraph};
//!
//! let mut graph = FlowGraph::new();
//! let n = graph.add_nodes(2);
//! graph.add_edge_with_capacity(n[0], n[1], Capacity::new(3.0)?)?;
//! let mut run = DinitzRun::new(&mut graph, 0, 1);
//! for step in &mut run {
//!     println!("{step}");
//! }
//! assert_eq!(run.max_flow(), Some(3.0));
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod graph;
pub mod logging;
pub mod playback;
pub mod precheck;
pub mod step;
pub mod types;

pub use engine::{run_max_flow, DinitzRun, RunOptions};
pub use graph::{Capacity, Edge, EdgeStore, FlowGraph};
pub use step::Step;
pub use types::{DinitzError, EdgeId, NodeIndex, NodeKey, Result};
