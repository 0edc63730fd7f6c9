#![forbid(unsafe_code)]

//! Dinic's algorithm, one observable step at a time.
//!
//! Every phase rebuilds a [`ResidualNetwork`] from the graph's current
//! flows, layers it with a BFS ([`build_levels`]) and then saturates the
//! layered network with repeated DFS attempts that share per-node
//! [`Cursors`]. The run stops as soon as the sink falls out of the BFS
//! layering; at that point no augmenting path exists and the accumulated
//! flow is maximal. The sink's level strictly grows from phase to phase, so
//! at most `V` phases run.
//!
//! [`DinitzRun`] drives the phases lazily as an iterator of
//! [`crate::step::Step`]s.

mod blocking;
mod level;
mod metrics;
mod options;
mod residual;
mod run;

pub use blocking::{Augment, Cursors};
pub use level::{build_levels, LevelGraph};
pub use metrics::{default_metrics, CounterMetrics, EngineMetrics, NoopMetrics};
pub use options::RunOptions;
pub use residual::{Orientation, ResidualArc, ResidualNetwork};
pub use run::{run_max_flow, DinitzRun};
