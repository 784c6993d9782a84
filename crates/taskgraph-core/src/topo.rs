//! Kahn topological ordering for DAGs and condensation graphs.
//!
//! The frontier is a FIFO seeded with every zero in-degree vertex in
//! ascending id order. A vertex is appended to the order when it leaves the
//! frontier, and a successor joins the frontier the moment its remaining
//! in-degree reaches zero.
//!
//! Vertices on a cycle never reach in-degree zero, so on a cyclic input the
//! order comes out shorter than the vertex count. [`TopoOrder::is_complete`]
//! is the cycle-detection signal and must be checked before the order is
//! trusted.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::TaskGraph;
use crate::metrics::MetricsSink;
use crate::scc::SccResult;

/// A (possibly partial) topological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopoOrder {
    /// Vertex order of the sorted graph. For a condensation graph these are
    /// component indices.
    pub order: Vec<usize>,
    /// Order of original task vertices. Equal to `order` for a plain DAG;
    /// for a condensation graph, each component expanded to its members.
    pub task_order: Vec<usize>,
    /// Vertex count of the sorted graph.
    pub vertex_count: usize,
}

impl TopoOrder {
    /// `true` when every vertex was ordered, i.e. the input was acyclic.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.order.len() == self.vertex_count
    }

    /// Return the order if complete.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotAcyclic`] when some vertices were never
    /// reached because they sit on or behind a cycle.
    pub fn into_complete(self) -> Result<Self, GraphError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(GraphError::NotAcyclic {
                ordered: self.order.len(),
                vertex_count: self.vertex_count,
            })
        }
    }

    /// Position of each vertex in `order`, or `None` for unordered vertices.
    #[must_use]
    pub fn positions(&self) -> Vec<Option<usize>> {
        let mut positions = vec![None; self.vertex_count];
        for (pos, &v) in self.order.iter().enumerate() {
            positions[v] = Some(pos);
        }
        positions
    }
}

/// Order the vertices of `graph` with Kahn's algorithm.
///
/// Frontier operations counted: one per edge scanned while computing
/// in-degrees, one per enqueue, one per dequeue and one per in-degree
/// decrement.
#[must_use]
#[instrument(skip(graph, metrics), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn topological_sort(graph: &TaskGraph, metrics: &mut dyn MetricsSink) -> TopoOrder {
    metrics.start();

    let n = graph.vertex_count();
    let mut in_degree = vec![0usize; n];
    for edge in graph.edges() {
        in_degree[edge.to] += 1;
        metrics.record_frontier_op();
    }

    let mut frontier: VecDeque<usize> = VecDeque::new();
    for (v, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            frontier.push_back(v);
            metrics.record_frontier_op();
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some(u) = frontier.pop_front() {
        metrics.record_frontier_op();
        order.push(u);

        for edge in graph.edges_from(u) {
            in_degree[edge.to] -= 1;
            metrics.record_frontier_op();
            if in_degree[edge.to] == 0 {
                frontier.push_back(edge.to);
                metrics.record_frontier_op();
            }
        }
    }

    metrics.stop();

    debug!(ordered = order.len(), vertices = n, "topological sort complete");
    TopoOrder {
        task_order: order.clone(),
        order,
        vertex_count: n,
    }
}

/// Order the condensation graph and expand it into a task order.
///
/// The task order concatenates the members of each component in component
/// order; members of one component appear in their stored order.
#[must_use]
#[instrument(skip(scc, metrics), fields(components = scc.component_count()))]
pub fn sort_condensation(scc: &SccResult, metrics: &mut dyn MetricsSink) -> TopoOrder {
    let mut sorted = topological_sort(&scc.condensation, metrics);
    sorted.task_order = sorted
        .order
        .iter()
        .flat_map(|&component| scc.components[component].iter().copied())
        .collect();
    sorted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, NoopMetrics};
    use crate::scc::strongly_connected_components;

    fn sort(n: usize, edges: &[(usize, usize, f64)]) -> (TaskGraph, TopoOrder) {
        let g = TaskGraph::from_edges(n, edges).expect("graph");
        let order = topological_sort(&g, &mut NoopMetrics);
        (g, order)
    }

    fn assert_respects_edges(g: &TaskGraph, order: &TopoOrder) {
        let pos = order.positions();
        for e in g.edges() {
            let (Some(pu), Some(pv)) = (pos[e.from], pos[e.to]) else {
                panic!("edge {} -> {} has an unordered endpoint", e.from, e.to);
            };
            assert!(pu < pv, "{} must precede {}", e.from, e.to);
        }
    }

    #[test]
    fn chain_is_ordered_front_to_back() {
        let (_, order) = sort(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        assert_eq!(order.order, vec![0, 1, 2]);
        assert_eq!(order.task_order, order.order);
        assert!(order.is_complete());
    }

    #[test]
    fn frontier_seeded_in_ascending_id_order() {
        // 3 and 1 are both sources; 1 must be dequeued first.
        let (g, order) = sort(4, &[(3, 0, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
        assert_eq!(order.order, vec![1, 3, 2, 0]);
        assert_respects_edges(&g, &order);
    }

    #[test]
    fn diamond_respects_all_edges() {
        let (g, order) = sort(4, &[(0, 1, 2.0), (0, 2, 1.0), (1, 3, 3.0), (2, 3, 5.0)]);
        assert!(order.is_complete());
        assert_respects_edges(&g, &order);
    }

    #[test]
    fn parallel_edges_need_every_copy_released() {
        let (g, order) = sort(2, &[(0, 1, 1.0), (0, 1, 2.0)]);
        assert_eq!(order.order, vec![0, 1]);
        assert_respects_edges(&g, &order);
    }

    #[test]
    fn cycle_yields_incomplete_order() {
        // 0 → 1 → 2 → 1, plus isolated 3.
        let (_, order) = sort(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0)]);
        assert_eq!(order.order, vec![0, 3]);
        assert!(!order.is_complete());
        assert_eq!(
            order.into_complete(),
            Err(GraphError::NotAcyclic {
                ordered: 2,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn condensation_expands_into_task_order() {
        // {0,1,2} cycle → 3 → 4 → 5
        let g = TaskGraph::from_edges(
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
        .expect("graph");
        let scc = strongly_connected_components(&g, &mut NoopMetrics);
        let sorted = sort_condensation(&scc, &mut NoopMetrics);

        assert!(sorted.is_complete());
        assert_eq!(sorted.vertex_count, 4);
        assert_eq!(sorted.task_order.len(), 6);

        let pos: Vec<usize> = (0..6)
            .map(|v| sorted.task_order.iter().position(|&t| t == v).expect("present"))
            .collect();
        for cyc in [0, 1, 2] {
            assert!(pos[cyc] < pos[3]);
        }
        assert!(pos[3] < pos[4]);
        assert!(pos[4] < pos[5]);
    }

    #[test]
    fn counts_frontier_operations() {
        let g = TaskGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).expect("graph");
        let mut counters = Counters::new();
        let _ = topological_sort(&g, &mut counters);
        // 2 in-degree scans, 3 enqueues, 3 dequeues, 2 decrements.
        assert_eq!(counters.frontier_ops, 10);
    }
}
