//! Single-source shortest and longest paths over a DAG, and critical paths.
//!
//! # Overview
//!
//! Distances are computed with one relaxation pass over a topological order.
//! The shortest and longest variants share a single implementation,
//! parameterized by an [`Objective`]: the sentinel meaning "not reached yet"
//! and the predicate deciding whether a candidate distance is strictly
//! better than the current one.
//!
//! | Objective   | Sentinel | Better when            |
//! |-------------|----------|------------------------|
//! | [`Shortest`]| `+∞`     | `candidate < current`  |
//! | [`Longest`] | `−∞`     | `candidate > current`  |
//!
//! Weights may have any sign. The engine never checks for cycles itself; it
//! relies on the completeness of the topological order and reports
//! [`GraphError::NotAcyclic`] before touching any distance when the order is
//! incomplete.
//!
//! # Critical path
//!
//! [`critical_path`] tries every zero in-degree vertex as a source (every
//! vertex when there is none), runs the longest-path pass from each, and
//! keeps the farthest reachable target overall. Ties are broken by
//! first-found: candidates are tried in ascending id order, and within one
//! run the lowest-id vertex among equally distant targets wins.

#![allow(clippy::module_name_repetitions, clippy::float_cmp)]

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::GraphError;
use crate::graph::TaskGraph;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::scc::SccResult;
use crate::topo::{TopoOrder, topological_sort};

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

/// Optimization direction of a path computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    Shortest,
    Longest,
}

impl PathMode {
    /// Distance value meaning "not reached".
    #[must_use]
    pub const fn unreached(self) -> f64 {
        match self {
            Self::Shortest => Shortest::UNREACHED,
            Self::Longest => Longest::UNREACHED,
        }
    }
}

/// Comparison policy for distance relaxation.
pub trait Objective {
    /// Mode recorded in the result.
    const MODE: PathMode;
    /// Initial distance of every vertex other than the source.
    const UNREACHED: f64;
    /// `true` when `candidate` strictly improves on `current`.
    fn improves(candidate: f64, current: f64) -> bool;
}

/// Minimize total weight.
#[derive(Debug, Clone, Copy)]
pub struct Shortest;

impl Objective for Shortest {
    const MODE: PathMode = PathMode::Shortest;
    const UNREACHED: f64 = f64::INFINITY;

    fn improves(candidate: f64, current: f64) -> bool {
        candidate < current
    }
}

/// Maximize total weight.
#[derive(Debug, Clone, Copy)]
pub struct Longest;

impl Objective for Longest {
    const MODE: PathMode = PathMode::Longest;
    const UNREACHED: f64 = f64::NEG_INFINITY;

    fn improves(candidate: f64, current: f64) -> bool {
        candidate > current
    }
}

// ---------------------------------------------------------------------------
// PathResult
// ---------------------------------------------------------------------------

/// Distances and predecessors from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub source: usize,
    pub mode: PathMode,
    /// Best distance per vertex; [`PathMode::unreached`] when unreachable.
    pub distances: Vec<f64>,
    /// Predecessor on the best path; `None` for the source and unreached
    /// vertices.
    pub predecessors: Vec<Option<usize>>,
}

impl PathResult {
    /// Stored distance to `target`, including the unreached sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of the analyzed graph.
    #[must_use]
    pub fn raw_distance(&self, target: usize) -> f64 {
        self.distances[target]
    }

    /// `true` when some path from the source reaches `target`.
    #[must_use]
    pub fn is_reachable(&self, target: usize) -> bool {
        self.distances
            .get(target)
            .is_some_and(|&d| d != self.mode.unreached())
    }

    /// Distance to `target`, or `None` when it is unreachable.
    #[must_use]
    pub fn distance(&self, target: usize) -> Option<f64> {
        if self.is_reachable(target) {
            Some(self.distances[target])
        } else {
            None
        }
    }

    /// Predecessor of `target` on its best path.
    #[must_use]
    pub fn predecessor(&self, target: usize) -> Option<usize> {
        self.predecessors.get(target).copied().flatten()
    }

    /// Vertices from the source to `target`, inclusive.
    ///
    /// Empty when `target` is unreachable (or not a vertex at all).
    #[must_use]
    pub fn reconstruct_path(&self, target: usize) -> Vec<usize> {
        if !self.is_reachable(target) {
            return Vec::new();
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.predecessor(current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }

    /// Reachable vertex with the greatest distance; lowest id on ties.
    #[must_use]
    pub fn farthest_vertex(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (v, &d) in self.distances.iter().enumerate() {
            if d == self.mode.unreached() {
                continue;
            }
            if best.is_none_or(|(_, best_d)| d > best_d) {
                best = Some((v, d));
            }
        }
        best.map(|(v, _)| v)
    }
}

// ---------------------------------------------------------------------------
// CriticalPath
// ---------------------------------------------------------------------------

/// The maximum-weight path of a DAG.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    /// Vertices from `source` to `target`, inclusive.
    pub path: Vec<usize>,
    /// Total weight along `path`.
    pub length: f64,
    pub source: usize,
    pub target: usize,
}

impl CriticalPath {
    /// Expand a path over condensation vertices into original task vertices.
    ///
    /// Each component contributes all of its members, in stored order.
    #[must_use]
    pub fn expand(&self, scc: &SccResult) -> Vec<usize> {
        self.path
            .iter()
            .flat_map(|&component| scc.components[component].iter().copied())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Shortest distances from `source` over the DAG `dag`.
///
/// # Errors
///
/// [`GraphError::InvalidVertex`] for a bad source, or
/// [`GraphError::NotAcyclic`] when `dag` contains a cycle.
#[instrument(skip(dag, metrics), fields(vertices = dag.vertex_count()))]
pub fn shortest_paths(
    dag: &TaskGraph,
    source: usize,
    metrics: &mut dyn MetricsSink,
) -> Result<PathResult, GraphError> {
    paths_with::<Shortest>(dag, source, metrics)
}

/// Longest distances from `source` over the DAG `dag`.
///
/// # Errors
///
/// [`GraphError::InvalidVertex`] for a bad source, or
/// [`GraphError::NotAcyclic`] when `dag` contains a cycle.
#[instrument(skip(dag, metrics), fields(vertices = dag.vertex_count()))]
pub fn longest_paths(
    dag: &TaskGraph,
    source: usize,
    metrics: &mut dyn MetricsSink,
) -> Result<PathResult, GraphError> {
    paths_with::<Longest>(dag, source, metrics)
}

/// Single-source distances under an arbitrary [`Objective`].
///
/// # Errors
///
/// [`GraphError::InvalidVertex`] for a bad source, or
/// [`GraphError::NotAcyclic`] when `dag` contains a cycle.
pub fn paths_with<O: Objective>(
    dag: &TaskGraph,
    source: usize,
    metrics: &mut dyn MetricsSink,
) -> Result<PathResult, GraphError> {
    dag.check_vertex(source)?;
    let order = acyclic_order(dag)?;

    metrics.start();
    let result = relax::<O>(dag, &order.order, source, metrics);
    metrics.stop();

    debug!(
        mode = ?O::MODE,
        source,
        reachable = result.distances.iter().filter(|&&d| d != O::UNREACHED).count(),
        "path relaxation complete"
    );
    Ok(result)
}

/// Find the longest path anywhere in the DAG.
///
/// # Errors
///
/// [`GraphError::NotAcyclic`] when `dag` contains a cycle.
#[instrument(skip(dag, metrics), fields(vertices = dag.vertex_count(), edges = dag.edge_count()))]
pub fn critical_path(
    dag: &TaskGraph,
    metrics: &mut dyn MetricsSink,
) -> Result<CriticalPath, GraphError> {
    let order = acyclic_order(dag)?;

    metrics.start();

    let mut candidates: Vec<usize> = dag
        .in_degrees()
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(v, _)| v)
        .collect();
    if candidates.is_empty() {
        candidates = (0..dag.vertex_count()).collect();
    }

    let mut best: Option<CriticalPath> = None;
    for &source in &candidates {
        let result = relax::<Longest>(dag, &order.order, source, metrics);
        let Some(target) = result.farthest_vertex() else {
            continue;
        };
        let length = result.raw_distance(target);
        if best.as_ref().is_none_or(|b| length > b.length) {
            best = Some(CriticalPath {
                path: result.reconstruct_path(target),
                length,
                source,
                target,
            });
        }
    }

    metrics.stop();

    match best {
        Some(best) => {
            debug!(
                candidates = candidates.len(),
                source = best.source,
                target = best.target,
                length = best.length,
                "critical path found"
            );
            Ok(best)
        }
        // Every candidate reaches itself at distance zero.
        None => unreachable!("critical path search had no reachable candidate"),
    }
}

fn acyclic_order(dag: &TaskGraph) -> Result<TopoOrder, GraphError> {
    topological_sort(dag, &mut NoopMetrics)
        .into_complete()
        .inspect_err(|err| warn!(%err, "refusing path computation on cyclic graph"))
}

fn relax<O: Objective>(
    dag: &TaskGraph,
    order: &[usize],
    source: usize,
    metrics: &mut dyn MetricsSink,
) -> PathResult {
    let n = dag.vertex_count();
    let mut distances = vec![O::UNREACHED; n];
    let mut predecessors = vec![None; n];
    distances[source] = 0.0;

    for &u in order {
        if distances[u] == O::UNREACHED {
            continue;
        }
        for edge in dag.edges_from(u) {
            metrics.record_relaxation();
            let candidate = distances[u] + edge.weight;
            if O::improves(candidate, distances[edge.to]) {
                distances[edge.to] = candidate;
                predecessors[edge.to] = Some(u);
            }
        }
    }

    PathResult {
        source,
        mode: O::MODE,
        distances,
        predecessors,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Counters;

    fn diamond() -> TaskGraph {
        TaskGraph::from_edges(4, &[(0, 1, 2.0), (0, 2, 1.0), (1, 3, 3.0), (2, 3, 5.0)])
            .expect("graph")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // -----------------------------------------------------------------------
    // Single-source distances
    // -----------------------------------------------------------------------

    #[test]
    fn diamond_shortest_takes_upper_branch() {
        let r = shortest_paths(&diamond(), 0, &mut NoopMetrics).expect("dag");
        assert_eq!(r.distance(3), Some(5.0));
        assert_eq!(r.reconstruct_path(3), vec![0, 1, 3]);
        assert_eq!(r.predecessor(3), Some(1));
    }

    #[test]
    fn diamond_longest_takes_lower_branch() {
        let r = longest_paths(&diamond(), 0, &mut NoopMetrics).expect("dag");
        assert_eq!(r.distance(3), Some(6.0));
        assert_eq!(r.reconstruct_path(3), vec![0, 2, 3]);
    }

    #[test]
    fn source_distance_is_zero_in_both_modes() {
        let g = diamond();
        for source in 0..4 {
            let s = shortest_paths(&g, source, &mut NoopMetrics).expect("dag");
            let l = longest_paths(&g, source, &mut NoopMetrics).expect("dag");
            assert_eq!(s.distance(source), Some(0.0));
            assert_eq!(l.distance(source), Some(0.0));
            assert_eq!(s.reconstruct_path(source), vec![source]);
        }
    }

    #[test]
    fn disconnected_targets_report_sentinel() {
        let g = TaskGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]).expect("graph");
        let r = shortest_paths(&g, 0, &mut NoopMetrics).expect("dag");

        assert_eq!(r.distance(1), Some(1.0));
        assert!(!r.is_reachable(2));
        assert!(!r.is_reachable(3));
        assert!(r.raw_distance(2).is_infinite() && r.raw_distance(2) > 0.0);
        assert!(r.reconstruct_path(3).is_empty());
        assert_eq!(r.predecessor(3), None);
    }

    #[test]
    fn longest_unreachable_uses_negative_sentinel() {
        let g = TaskGraph::from_edges(3, &[(1, 0, 1.0), (1, 2, 1.0)]).expect("graph");
        let r = longest_paths(&g, 0, &mut NoopMetrics).expect("dag");
        assert_eq!(r.raw_distance(1), f64::NEG_INFINITY);
        assert!(r.reconstruct_path(1).is_empty());
        assert!(r.reconstruct_path(2).is_empty());
    }

    #[test]
    fn negative_weights_are_relaxed_normally() {
        let g = TaskGraph::from_edges(3, &[(0, 1, -2.0), (1, 2, -3.0), (0, 2, -4.0)])
            .expect("graph");
        let s = shortest_paths(&g, 0, &mut NoopMetrics).expect("dag");
        let l = longest_paths(&g, 0, &mut NoopMetrics).expect("dag");
        assert_eq!(s.distance(2), Some(-5.0));
        assert_eq!(l.distance(2), Some(-4.0));
        assert_eq!(l.reconstruct_path(2), vec![0, 2]);
    }

    #[test]
    fn equal_candidate_does_not_replace_predecessor() {
        // Both branches cost 3; the first relaxed (via 1) is kept.
        let g = TaskGraph::from_edges(4, &[(0, 1, 1.0), (0, 2, 2.0), (1, 3, 2.0), (2, 3, 1.0)])
            .expect("graph");
        let r = shortest_paths(&g, 0, &mut NoopMetrics).expect("dag");
        assert_eq!(r.reconstruct_path(3), vec![0, 1, 3]);
    }

    #[test]
    fn out_of_range_source_rejected() {
        let err = shortest_paths(&diamond(), 9, &mut NoopMetrics).expect_err("bad source");
        assert_eq!(
            err,
            GraphError::InvalidVertex {
                vertex: 9,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn cyclic_input_rejected_before_relaxation() {
        let g = TaskGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0)]).expect("graph");
        let mut counters = Counters::new();
        let err = longest_paths(&g, 0, &mut counters).expect_err("cycle");
        assert!(matches!(err, GraphError::NotAcyclic { ordered: 1, vertex_count: 3 }));
        assert_eq!(counters.relaxations, 0);
    }

    #[test]
    fn relaxations_counted_only_from_reached_vertices() {
        let g = TaskGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]).expect("graph");
        let mut counters = Counters::new();
        let _ = shortest_paths(&g, 0, &mut counters).expect("dag");
        assert_eq!(counters.relaxations, 1);
        assert_eq!(counters.frontier_ops, 0, "internal sort is not reported");
    }

    #[test]
    fn farthest_vertex_prefers_lowest_id_on_ties() {
        let g = TaskGraph::from_edges(3, &[(0, 1, 4.0), (0, 2, 4.0)]).expect("graph");
        let r = longest_paths(&g, 0, &mut NoopMetrics).expect("dag");
        assert_eq!(r.farthest_vertex(), Some(1));
    }

    // -----------------------------------------------------------------------
    // Critical path
    // -----------------------------------------------------------------------

    #[test]
    fn single_vertex_critical_path() {
        let g = TaskGraph::new(1).expect("graph");
        let cp = critical_path(&g, &mut NoopMetrics).expect("dag");
        assert_eq!(cp.path, vec![0]);
        assert!(approx(cp.length, 0.0));
        assert_eq!((cp.source, cp.target), (0, 0));
    }

    #[test]
    fn diamond_critical_path() {
        let cp = critical_path(&diamond(), &mut NoopMetrics).expect("dag");
        assert_eq!(cp.path, vec![0, 2, 3]);
        assert!(approx(cp.length, 6.0));
        assert_eq!((cp.source, cp.target), (0, 3));
    }

    #[test]
    fn disjoint_sources_pick_heavier_chain() {
        // 0 → 1 (w=2) and 2 → 3 → 4 (w=1+5)
        let g = TaskGraph::from_edges(5, &[(0, 1, 2.0), (2, 3, 1.0), (3, 4, 5.0)]).expect("graph");
        let cp = critical_path(&g, &mut NoopMetrics).expect("dag");
        assert_eq!(cp.path, vec![2, 3, 4]);
        assert!(approx(cp.length, 6.0));
        assert_eq!(cp.source, 2);
    }

    #[test]
    fn equal_length_sources_keep_first_candidate() {
        let g = TaskGraph::from_edges(4, &[(0, 1, 3.0), (2, 3, 3.0)]).expect("graph");
        let cp = critical_path(&g, &mut NoopMetrics).expect("dag");
        assert_eq!(cp.path, vec![0, 1]);
    }

    #[test]
    fn all_negative_edges_leave_source_alone() {
        let g = TaskGraph::from_edges(2, &[(0, 1, -1.0)]).expect("graph");
        let cp = critical_path(&g, &mut NoopMetrics).expect("dag");
        assert_eq!(cp.path, vec![0]);
        assert!(approx(cp.length, 0.0));
    }

    #[test]
    fn critical_path_on_cycle_is_rejected() {
        let g = TaskGraph::from_edges(2, &[(0, 1, 1.0), (1, 0, 1.0)]).expect("graph");
        assert!(matches!(
            critical_path(&g, &mut NoopMetrics),
            Err(GraphError::NotAcyclic { ordered: 0, vertex_count: 2 })
        ));
    }

    #[test]
    fn critical_path_expands_components_to_tasks() {
        use crate::scc::strongly_connected_components;

        // {0,1} cycle → 2 (w=4)
        let g = TaskGraph::from_edges(3, &[(0, 1, 1.0), (1, 0, 1.0), (1, 2, 4.0)]).expect("graph");
        let scc = strongly_connected_components(&g, &mut NoopMetrics);
        let cp = critical_path(&scc.condensation, &mut NoopMetrics).expect("dag");

        assert!(approx(cp.length, 4.0));
        let mut tasks = cp.expand(&scc);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks.pop(), Some(2));
    }
}
