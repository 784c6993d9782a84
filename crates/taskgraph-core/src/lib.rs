#![forbid(unsafe_code)]
//! taskgraph-core library.
//!
//! Scheduling analysis for directed, weighted task graphs: strongly connected
//! components and condensation, topological ordering, and DAG shortest /
//! longest (critical) paths.
//!
//! # Conventions
//!
//! - **Errors**: Engines return [`GraphError`]; I/O-facing helpers use
//!   `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Instrumentation**: Every engine takes an explicit `&mut dyn MetricsSink`.
//!
//! # Typical Usage
//!
//! ```rust
//! use taskgraph_core::{NoopMetrics, TaskGraph, critical_path, strongly_connected_components};
//!
//! let mut graph = TaskGraph::new(3)?;
//! graph.add_edge(0, 1, 2.0)?;
//! graph.add_edge(1, 0, 1.0)?;
//! graph.add_edge(1, 2, 4.0)?;
//!
//! let scc = strongly_connected_components(&graph, &mut NoopMetrics);
//! assert_eq!(scc.component_count(), 2);
//!
//! let cp = critical_path(&scc.condensation, &mut NoopMetrics)?;
//! assert_eq!(cp.length, 4.0);
//! # Ok::<(), taskgraph_core::GraphError>(())
//! ```

pub mod analysis;
pub mod error;
pub mod generate;
pub mod graph;
pub mod loader;
pub mod metrics;
pub mod paths;
pub mod scc;
pub mod topo;

pub use analysis::{Analysis, AnalysisReport, analyze};
pub use error::GraphError;
pub use graph::{Edge, TaskGraph};
pub use metrics::{Counters, MetricsSink, NoopMetrics};
pub use paths::{
    CriticalPath, Longest, Objective, PathMode, PathResult, Shortest, critical_path,
    longest_paths, shortest_paths,
};
pub use scc::{SccResult, strongly_connected_components};
pub use topo::{TopoOrder, sort_condensation, topological_sort};
