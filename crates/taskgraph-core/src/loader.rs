//! JSON ingestion of task-graph datasets.
//!
//! # Format
//!
//! ```json
//! {
//!   "directed": true,
//!   "n": 4,
//!   "edges": [{ "u": 0, "v": 1, "w": 2.0 }],
//!   "source": 0,
//!   "weight_model": "edge"
//! }
//! ```
//!
//! `directed` and `weight_model` are optional and default to `true` and
//! `"edge"`. `source` is optional; callers fall back to their own default
//! (vertex 0 unless configured otherwise). Edges are added in document order, which fixes
//! the adjacency order seen by the analysis engines.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::TaskGraph;

/// One serialized edge `u → v` with weight `w`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub u: usize,
    pub v: usize,
    pub w: f64,
}

/// A dataset as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default = "default_true")]
    pub directed: bool,
    pub n: usize,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(default = "default_weight_model")]
    pub weight_model: String,
}

impl GraphData {
    /// Read and parse a dataset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON of
    /// the expected shape.
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse a dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` does not describe a dataset.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid graph JSON")
    }

    /// Build the in-memory graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is undirected, `n` is zero, any edge
    /// endpoint is out of range, or `source` is out of range.
    pub fn to_graph(&self) -> Result<TaskGraph> {
        ensure!(self.directed, "only directed graphs are supported");

        let mut graph = TaskGraph::new(self.n).context("invalid vertex count")?;
        for (idx, edge) in self.edges.iter().enumerate() {
            graph
                .add_edge(edge.u, edge.v, edge.w)
                .with_context(|| format!("invalid edge #{idx} ({} -> {})", edge.u, edge.v))?;
        }
        if let Some(source) = self.source {
            graph.check_vertex(source).context("invalid source vertex")?;
        }

        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            source = ?self.source,
            weight_model = %self.weight_model,
            "graph loaded"
        );
        Ok(graph)
    }

    /// Capture `graph` as a serializable dataset.
    #[must_use]
    pub fn from_graph(graph: &TaskGraph, source: usize, weight_model: &str) -> Self {
        Self {
            directed: true,
            n: graph.vertex_count(),
            edges: graph
                .edges()
                .map(|e| EdgeData {
                    u: e.from,
                    v: e.to,
                    w: e.weight,
                })
                .collect(),
            source: Some(source),
            weight_model: weight_model.to_string(),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (non-finite weights).
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize graph data")
    }
}

/// Load a dataset file and build its graph in one step.
///
/// # Errors
///
/// See [`GraphData::from_path`] and [`GraphData::to_graph`].
pub fn load_graph(path: &Path) -> Result<(GraphData, TaskGraph)> {
    let data = GraphData::from_path(path)?;
    let graph = data
        .to_graph()
        .with_context(|| format!("Invalid graph in {}", path.display()))?;
    Ok((data, graph))
}

const fn default_true() -> bool {
    true
}

fn default_weight_model() -> String {
    "edge".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
