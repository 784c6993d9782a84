//! Typed errors for graph construction and analysis.
//!
//! Only contract violations and structural failures are errors. Legitimate
//! "no result" outcomes (an unreachable vertex, an empty reconstructed path)
//! are encoded in result values instead.

use thiserror::Error;

/// Errors raised by the graph store and the analysis engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A graph was requested with zero vertices.
    #[error("graph must have at least one vertex")]
    EmptyGraph,

    /// A vertex id outside `[0, vertex_count)` was supplied.
    #[error("vertex {vertex} is out of range for a graph with {vertex_count} vertices")]
    InvalidVertex { vertex: usize, vertex_count: usize },

    /// The topological order did not cover every vertex, so the graph holds
    /// at least one cycle and path distances would be meaningless.
    #[error("graph is not acyclic: topological order reached {ordered} of {vertex_count} vertices")]
    NotAcyclic { ordered: usize, vertex_count: usize },
}

impl GraphError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyGraph => "E1001",
            Self::InvalidVertex { .. } => "E1002",
            Self::NotAcyclic { .. } => "E2001",
        }
    }

    /// Optional remediation hint surfaced next to the error message.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyGraph => Some("Declare a positive vertex count `n`."),
            Self::InvalidVertex { .. } => Some("Vertex ids are dense integers in 0..n."),
            Self::NotAcyclic { .. } => {
                Some("Run path analysis on the condensation graph, which is always acyclic.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GraphError;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_machine_friendly() {
        let all = [
            GraphError::EmptyGraph,
            GraphError::InvalidVertex {
                vertex: 3,
                vertex_count: 2,
            },
            GraphError::NotAcyclic {
                ordered: 1,
                vertex_count: 2,
            },
        ];

        let mut seen = HashSet::new();
        for err in &all {
            let code = err.code();
            assert!(seen.insert(code), "duplicate code {code}");
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn invalid_vertex_message_names_both_numbers() {
        let err = GraphError::InvalidVertex {
            vertex: 7,
            vertex_count: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('4'));
    }
}
