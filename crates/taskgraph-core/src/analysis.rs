//! End-to-end scheduling analysis of a task graph.
//!
//! ## Pipeline
//!
//! ```text
//! TaskGraph (may contain cycles)
//!        ↓  scc::strongly_connected_components()
//! SccResult (components, condensation DAG, vertex → component)
//!        ↓  topo::sort_condensation()
//! TopoOrder (component order, task order)
//!        ↓  paths::shortest_paths(condensation, component_of[source])
//! PathResult (distances from the source's component)
//!        ↓  paths::critical_path(condensation)
//! CriticalPath (longest chain of components)
//! ```
//!
//! Each stage gets its own [`Counters`], reported alongside the results.

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::GraphError;
use crate::graph::TaskGraph;
use crate::metrics::Counters;
use crate::paths::{CriticalPath, PathResult, critical_path, shortest_paths};
use crate::scc::{SccResult, strongly_connected_components};
use crate::topo::{TopoOrder, sort_condensation};

/// Per-stage instrumentation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageCounters {
    pub scc: Counters,
    pub topo: Counters,
    pub shortest: Counters,
    pub critical: Counters,
}

/// Every artifact of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: usize,
    pub source_component: usize,
    pub scc: SccResult,
    pub order: TopoOrder,
    pub shortest: PathResult,
    pub critical: CriticalPath,
    pub counters: StageCounters,
}

/// Run the four-stage pipeline on `graph` starting from `source`.
///
/// Shortest paths and the critical path are computed on the condensation
/// graph, so cycles in `graph` never make the analysis fail.
///
/// # Errors
///
/// Returns [`GraphError::InvalidVertex`] if `source` is not a vertex of
/// `graph`.
#[instrument(skip(graph), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn analyze(graph: &TaskGraph, source: usize) -> Result<Analysis, GraphError> {
    graph.check_vertex(source)?;
    let mut counters = StageCounters::default();

    let scc = strongly_connected_components(graph, &mut counters.scc);
    let order = sort_condensation(&scc, &mut counters.topo);
    let source_component = scc.component_of(source);
    let shortest = shortest_paths(&scc.condensation, source_component, &mut counters.shortest)?;
    let critical = critical_path(&scc.condensation, &mut counters.critical)?;

    info!(
        components = scc.component_count(),
        cyclic = scc.cyclic_components().len(),
        critical_length = critical.length,
        "analysis complete"
    );

    Ok(Analysis {
        source,
        source_component,
        scc,
        order,
        shortest,
        critical,
        counters,
    })
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Serializable summary of an [`Analysis`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub vertices: usize,
    pub edges: usize,
    pub content_hash: String,
    pub source: usize,
    pub source_component: usize,
    pub components: Vec<Vec<usize>>,
    pub component_sizes: Vec<usize>,
    pub condensation_edges: usize,
    pub component_order: Vec<usize>,
    pub task_order: Vec<usize>,
    /// Shortest distance from the source's component to every component;
    /// `None` when unreachable.
    pub shortest_distances: Vec<Option<f64>>,
    pub critical_path: CriticalPath,
    /// Critical path expanded to original task vertices.
    pub critical_tasks: Vec<usize>,
    pub counters: StageCounters,
}

impl AnalysisReport {
    /// Summarize `analysis` of `graph`.
    #[must_use]
    pub fn new(graph: &TaskGraph, analysis: &Analysis) -> Self {
        let scc = &analysis.scc;
        Self {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            content_hash: graph.content_hash(),
            source: analysis.source,
            source_component: analysis.source_component,
            components: scc.components.clone(),
            component_sizes: scc.component_sizes(),
            condensation_edges: scc.condensation.edge_count(),
            component_order: analysis.order.order.clone(),
            task_order: analysis.order.task_order.clone(),
            shortest_distances: (0..scc.component_count())
                .map(|c| analysis.shortest.distance(c))
                .collect(),
            critical_path: analysis.critical.clone(),
            critical_tasks: analysis.critical.expand(scc),
            counters: analysis.counters.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle_then_chain() -> TaskGraph {
        // {0,1,2} cycle → 3 → 4 → 5
        TaskGraph::from_edges(
            6,
            &[
                (0, 1, 1.0),
                (1, 2, 2.0),
                (2, 0, 3.0),
                (3, 4, 4.0),
                (4, 5, 5.0),
                (2, 3, 1.0),
            ],
        )
        .expect("graph")
    }

    #[test]
    fn pipeline_on_cyclic_graph() {
        let g = cycle_then_chain();
        let a = analyze(&g, 0).expect("analysis");

        assert_eq!(a.scc.component_count(), 4);
        assert!(a.order.is_complete());
        assert_eq!(a.order.task_order.len(), 6);
        assert!((a.critical.length - 10.0).abs() < 1e-9);
        assert_eq!(a.shortest.distance(a.source_component), Some(0.0));

        let tail = a.scc.component_of(5);
        assert_eq!(a.shortest.distance(tail), Some(10.0));
    }

    #[test]
    fn stage_counters_are_independent() {
        let a = analyze(&cycle_then_chain(), 0).expect("analysis");
        assert_eq!(a.counters.scc.visits, 12, "6 discoveries + 6 edges");
        assert_eq!(a.counters.scc.relaxations, 0);
        assert!(a.counters.topo.frontier_ops > 0);
        assert_eq!(a.counters.topo.visits, 0);
        assert_eq!(a.counters.shortest.relaxations, 3);
        assert_eq!(a.counters.critical.relaxations, 3, "one candidate source");
    }

    #[test]
    fn invalid_source_rejected() {
        let err = analyze(&cycle_then_chain(), 6).expect_err("bad source");
        assert_eq!(err.code(), "E1002");
    }

    #[test]
    fn report_serializes_unreachable_as_null() {
        let g = TaskGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]).expect("graph");
        let a = analyze(&g, 0).expect("analysis");
        let report = AnalysisReport::new(&g, &a);

        assert_eq!(report.vertices, 4);
        assert_eq!(report.component_sizes.iter().sum::<usize>(), 4);
        assert_eq!(
            report.shortest_distances.iter().filter(|d| d.is_none()).count(),
            2
        );

        let json = serde_json::to_value(&report).expect("serialize");
        let nulls = json["shortest_distances"]
            .as_array()
            .expect("array")
            .iter()
            .filter(|v| v.is_null())
            .count();
        assert_eq!(nulls, 2);
        assert!(json["content_hash"].as_str().expect("hash").starts_with("blake3:"));
    }
}
