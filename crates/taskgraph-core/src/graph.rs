//! Adjacency-list storage for directed, edge-weighted task graphs.
//!
//! # Overview
//!
//! Vertices are dense integer ids `0..n`. Each vertex owns an ordered list of
//! its outgoing [`Edge`]s; insertion order is preserved because it drives DFS
//! visitation order in the SCC engine and therefore the order in which
//! components are enumerated.
//!
//! The store performs no cycle or weight-sign validation. Those checks belong
//! to the algorithm consuming the graph.
//!
//! ## Edge Direction
//!
//! An edge `u → v` means "`u` must finish before `v` can start", carrying the
//! weight of that dependency.

#![allow(clippy::module_name_repetitions)]

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A directed, weighted dependency `from → to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// TaskGraph
// ---------------------------------------------------------------------------

/// A directed graph over vertices `0..n` with weighted edges.
///
/// The vertex count is fixed at construction and is always positive. Edges
/// are appended during build; afterwards the graph is only read.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGraph {
    adjacency: Vec<Vec<Edge>>,
}

impl TaskGraph {
    /// Create a graph with `n` vertices and no edges.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyGraph`] when `n == 0`.
    pub fn new(n: usize) -> Result<Self, GraphError> {
        if n == 0 {
            return Err(GraphError::EmptyGraph);
        }
        Ok(Self {
            adjacency: vec![Vec::new(); n],
        })
    }

    /// Build a graph from `(from, to, weight)` triples, in order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyGraph`] when `n == 0`, or
    /// [`GraphError::InvalidVertex`] for the first out-of-range endpoint.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Result<Self, GraphError> {
        let mut graph = Self::new(n)?;
        for &(from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    /// Append `from → to` with `weight` to `from`'s adjacency list.
    ///
    /// Parallel edges and self-loops are stored as given.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidVertex`] if either endpoint is outside
    /// `[0, n)`; the graph is left unchanged.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.adjacency[from].push(Edge { from, to, weight });
        Ok(())
    }

    /// Outgoing edges of `u` in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `u` is not a vertex of this graph.
    #[must_use]
    pub fn edges_from(&self, u: usize) -> &[Edge] {
        &self.adjacency[u]
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of stored edges, including parallels and self-loops.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Every edge, grouped by source vertex in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }

    /// Return `Ok(())` when `v` is a vertex of this graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidVertex`] otherwise.
    pub fn check_vertex(&self, v: usize) -> Result<(), GraphError> {
        if v < self.vertex_count() {
            Ok(())
        } else {
            Err(GraphError::InvalidVertex {
                vertex: v,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// In-degree of every vertex, counting parallel edges separately.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0; self.vertex_count()];
        for edge in self.edges() {
            in_degree[edge.to] += 1;
        }
        in_degree
    }

    /// A new graph with every edge flipped, weights preserved.
    ///
    /// Edges land in the reversed graph in the order they are met while
    /// scanning the original by ascending source vertex.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let mut adjacency = vec![Vec::new(); self.vertex_count()];
        for edge in self.edges() {
            adjacency[edge.to].push(Edge {
                from: edge.to,
                to: edge.from,
                weight: edge.weight,
            });
        }
        Self { adjacency }
    }

    /// BLAKE3 hash of the vertex count and the ordered edge list.
    ///
    /// Stable across runs; changes whenever an edge, weight or the edge
    /// order changes.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.vertex_count() as u64).to_le_bytes());
        for edge in self.edges() {
            hasher.update(&(edge.from as u64).to_le_bytes());
            hasher.update(&(edge.to as u64).to_le_bytes());
            hasher.update(&edge.weight.to_bits().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }

    /// Copy into a petgraph [`DiGraph`] whose node weights are vertex ids.
    ///
    /// Node `i` of the result is vertex `i` of this graph.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<usize, f64> {
        let mut graph = DiGraph::with_capacity(self.vertex_count(), self.edge_count());
        for v in 0..self.vertex_count() {
            graph.add_node(v);
        }
        for edge in self.edges() {
            graph.add_edge(NodeIndex::new(edge.from), NodeIndex::new(edge.to), edge.weight);
        }
        graph
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
