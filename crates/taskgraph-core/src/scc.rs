//! Strongly connected components and condensation.
//!
//! # Overview
//!
//! The raw task graph may contain cycles (tasks that transitively depend on
//! each other). This module partitions vertices into strongly connected
//! components with Tarjan's low-link algorithm and collapses each component
//! into a single node of the **condensation graph**, which is always a DAG.
//!
//! # Algorithm
//!
//! 1. Depth-first search from every undiscovered vertex, in ascending id
//!    order, exploring each vertex's edges in insertion order. The DFS is
//!    driven by an explicit frame stack (vertex plus next-edge cursor), so
//!    deep or skewed graphs cannot exhaust the thread stack.
//! 2. Each vertex gets a discovery index and a low-link. When a successor is
//!    still on the component stack, the low-link is tightened to the
//!    successor's *discovery index*.
//! 3. A finished vertex whose low-link equals its discovery index is a
//!    component root: the stack is popped down to it and the popped vertices
//!    form one component, in pop order. Components therefore come out in
//!    **reverse topological order** of the condensation graph.
//! 4. Every edge whose endpoints fall in different components contributes
//!    one condensation edge per ordered component pair. The first such edge
//!    met (scanning vertices ascending, edges in insertion order) supplies
//!    the weight; later duplicates are dropped.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use fixedbitset::FixedBitSet;
use tracing::{debug, instrument};

use crate::graph::TaskGraph;
use crate::metrics::MetricsSink;

// ---------------------------------------------------------------------------
// SccResult
// ---------------------------------------------------------------------------

/// Components of a graph plus its condensation.
#[derive(Debug, Clone)]
pub struct SccResult {
    /// One entry per component, in emission order (reverse topological).
    /// Members are listed in stack-pop order.
    pub components: Vec<Vec<usize>>,
    /// DAG with one vertex per component; no self-loops, no parallel edges.
    pub condensation: TaskGraph,
    /// `component_of[v]` is the index into `components` holding vertex `v`.
    pub component_of: Vec<usize>,
}

impl SccResult {
    /// Number of strongly connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Size of every component, in component order.
    #[must_use]
    pub fn component_sizes(&self) -> Vec<usize> {
        self.components.iter().map(Vec::len).collect()
    }

    /// Component index of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex of the analyzed graph.
    #[must_use]
    pub fn component_of(&self, v: usize) -> usize {
        self.component_of[v]
    }

    /// Indices of components with more than one member (dependency cycles).
    ///
    /// A lone vertex with a self-loop is not reported here.
    #[must_use]
    pub fn cyclic_components(&self) -> Vec<usize> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, members)| members.len() > 1)
            .map(|(idx, _)| idx)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tarjan
// ---------------------------------------------------------------------------

/// One suspended DFS call: the vertex and the next outgoing edge to explore.
#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: usize,
    next_edge: usize,
}

/// Working state of a single Tarjan run.
struct Tarjan<'g> {
    graph: &'g TaskGraph,
    next_index: usize,
    index: Vec<Option<usize>>,
    low_link: Vec<usize>,
    on_stack: FixedBitSet,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g TaskGraph) -> Self {
        let n = graph.vertex_count();
        Self {
            graph,
            next_index: 0,
            index: vec![None; n],
            low_link: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::with_capacity(n),
            components: Vec::new(),
        }
    }

    fn discover(&mut self, v: usize, metrics: &mut dyn MetricsSink) {
        metrics.record_visit();
        self.index[v] = Some(self.next_index);
        self.low_link[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
    }

    fn strong_connect(&mut self, root: usize, metrics: &mut dyn MetricsSink) {
        self.discover(root, metrics);
        let mut frames = vec![Frame {
            vertex: root,
            next_edge: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;

            if let Some(edge) = self.graph.edges_from(v).get(frame.next_edge) {
                frame.next_edge += 1;
                metrics.record_visit();

                let w = edge.to;
                match self.index[w] {
                    None => {
                        self.discover(w, metrics);
                        frames.push(Frame {
                            vertex: w,
                            next_edge: 0,
                        });
                    }
                    Some(w_index) if self.on_stack.contains(w) => {
                        self.low_link[v] = self.low_link[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            // All edges of `v` explored: return to the caller frame.
            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.vertex;
                self.low_link[p] = self.low_link[p].min(self.low_link[v]);
            }

            if Some(self.low_link[v]) == self.index[v] {
                self.emit_component(v);
            }
        }
    }

    fn emit_component(&mut self, root: usize) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.set(w, false);
            component.push(w);
            if w == root {
                break;
            }
        }
        self.components.push(component);
    }
}

/// Compute the strongly connected components of `graph` and its condensation.
///
/// Reports one visit per vertex discovery and one per edge explored.
#[must_use]
#[instrument(skip(graph, metrics), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn strongly_connected_components(graph: &TaskGraph, metrics: &mut dyn MetricsSink) -> SccResult {
    metrics.start();

    let mut tarjan = Tarjan::new(graph);
    for v in 0..graph.vertex_count() {
        if tarjan.index[v].is_none() {
            tarjan.strong_connect(v, metrics);
        }
    }

    metrics.stop();

    let result = build_condensation(graph, tarjan.components);
    debug!(
        components = result.component_count(),
        condensation_edges = result.condensation.edge_count(),
        cyclic = result.cyclic_components().len(),
        "scc decomposition complete"
    );
    result
}

// ---------------------------------------------------------------------------
// Condensation
// ---------------------------------------------------------------------------

fn build_condensation(graph: &TaskGraph, components: Vec<Vec<usize>>) -> SccResult {
    let mut component_of = vec![0; graph.vertex_count()];
    for (idx, members) in components.iter().enumerate() {
        for &v in members {
            component_of[v] = idx;
        }
    }

    let mut edges: Vec<(usize, usize, f64)> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for edge in graph.edges() {
        let from = component_of[edge.from];
        let to = component_of[edge.to];
        if from != to && seen.insert((from, to)) {
            edges.push((from, to, edge.weight));
        }
    }

    // Every vertex lands in exactly one component, so there is at least one
    // component and every endpoint is in range.
    let mut condensation = empty_like(components.len());
    for (from, to, weight) in edges {
        condensation
            .add_edge(from, to, weight)
            .unwrap_or_else(|err| unreachable!("condensation endpoint out of range: {err}"));
    }

    SccResult {
        components,
        condensation,
        component_of,
    }
}

fn empty_like(component_count: usize) -> TaskGraph {
    TaskGraph::new(component_count)
        .unwrap_or_else(|err| unreachable!("non-empty graph has no components: {err}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
