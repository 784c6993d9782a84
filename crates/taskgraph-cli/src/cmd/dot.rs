//! `taskgraph dot`: Graphviz export of a dataset or its condensation.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;

use taskgraph_core::loader::load_graph;
use taskgraph_core::{NoopMetrics, SccResult, TaskGraph, strongly_connected_components};

use crate::output::join_ids;

/// Arguments for `taskgraph dot`.
#[derive(Args, Debug)]
pub struct DotArgs {
    /// Dataset JSON file.
    pub file: PathBuf,

    /// Export the condensation graph (one node per component) instead.
    #[arg(long)]
    pub condensed: bool,
}

pub fn run_dot(args: &DotArgs) -> Result<()> {
    let (_, graph) = load_graph(&args.file)?;
    let labelled = if args.condensed {
        let scc = strongly_connected_components(&graph, &mut NoopMetrics);
        condensed_digraph(&scc)
    } else {
        task_digraph(&graph)
    };

    let mut out = io::stdout().lock();
    write!(out, "{}", Dot::new(&labelled))?;
    Ok(())
}

fn task_digraph(graph: &TaskGraph) -> DiGraph<String, f64> {
    graph.to_digraph().map(|_, v| v.to_string(), |_, w| *w)
}

/// Component nodes labelled `C<id> [members]`.
fn condensed_digraph(scc: &SccResult) -> DiGraph<String, f64> {
    scc.condensation.to_digraph().map(
        |_, &c| format!("C{c} [{}]", join_ids(&scc.components[c])),
        |_, w| *w,
    )
}
