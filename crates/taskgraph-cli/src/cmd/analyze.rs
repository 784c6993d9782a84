//! `taskgraph analyze`: Run the full scheduling analysis on a dataset.
//!
//! Stages: SCC condensation, component ordering, shortest distances from the
//! source's component, and the critical path. Path stages run on the
//! condensation graph, so cyclic inputs are fine.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use taskgraph_core::analysis::StageCounters;
use taskgraph_core::loader::load_graph;
use taskgraph_core::{AnalysisReport, analyze};

use crate::config::Settings;
use crate::output::{OutputMode, join_ids, pretty_kv, pretty_section, render_mode};

// ---------------------------------------------------------------------------
// Clap types
// ---------------------------------------------------------------------------

/// Arguments for `taskgraph analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Dataset JSON file.
    pub file: PathBuf,

    /// Source vertex for shortest distances (overrides the dataset and config).
    #[arg(long, short)]
    pub source: Option<usize>,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Load `args.file`, analyze it and render the report.
///
/// The source vertex is taken from `--source`, then the dataset's own
/// `source`, then `[analysis] source`, then vertex 0.
pub fn run_analyze(
    args: &AnalyzeArgs,
    settings: &Settings,
    output: OutputMode,
    timing: bool,
) -> Result<()> {
    let (data, graph) = load_graph(&args.file)?;
    let source = args
        .source
        .or(data.source)
        .or(settings.source)
        .unwrap_or(0);

    let analysis = analyze(&graph, source).map_err(|err| {
        let hint = err.hint().unwrap_or_default();
        anyhow::anyhow!("[{}] {err}. {hint}", err.code())
    })
    .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    let report = AnalysisReport::new(&graph, &analysis);
    info!(
        file = %args.file.display(),
        components = report.components.len(),
        critical_length = report.critical_path.length,
        "analyzed"
    );

    if timing {
        write_stage_counters(&mut io::stderr().lock(), &report.counters)?;
    }

    render_mode(output, &report, render_text, render_pretty)
}

fn write_stage_counters(w: &mut dyn Write, counters: &StageCounters) -> io::Result<()> {
    writeln!(w, "timing report:")?;
    for (stage, c) in [
        ("scc", &counters.scc),
        ("topo", &counters.topo),
        ("shortest", &counters.shortest),
        ("critical", &counters.critical),
    ] {
        writeln!(w, "  {stage:<9} {c}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn cyclic_count(report: &AnalysisReport) -> usize {
    report.component_sizes.iter().filter(|&&s| s > 1).count()
}

fn fmt_distance(d: Option<f64>) -> String {
    d.map_or_else(|| "unreachable".to_string(), |d| d.to_string())
}

fn render_text(report: &AnalysisReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "vertices={} edges={} components={} cyclic={} condensation_edges={} hash={}",
        report.vertices,
        report.edges,
        report.components.len(),
        cyclic_count(report),
        report.condensation_edges,
        report.content_hash
    )?;
    for (idx, members) in report.components.iter().enumerate() {
        writeln!(w, "component {idx}: {}", join_ids(members))?;
    }
    writeln!(w, "component_order: {}", join_ids(&report.component_order))?;
    writeln!(w, "task_order: {}", join_ids(&report.task_order))?;
    writeln!(
        w,
        "source={} source_component={}",
        report.source, report.source_component
    )?;
    for (c, d) in report.shortest_distances.iter().enumerate() {
        writeln!(w, "distance {c}: {}", fmt_distance(*d))?;
    }
    writeln!(
        w,
        "critical_length={} critical_components: {}",
        report.critical_path.length,
        join_ids(&report.critical_path.path)
    )?;
    writeln!(w, "critical_tasks: {}", join_ids(&report.critical_tasks))
}

fn render_pretty(report: &AnalysisReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Graph")?;
    pretty_kv(w, "vertices", report.vertices.to_string())?;
    pretty_kv(w, "edges", report.edges.to_string())?;
    pretty_kv(w, "content hash", &report.content_hash)?;
    writeln!(w)?;

    pretty_section(w, "Strongly connected components")?;
    pretty_kv(w, "components", report.components.len().to_string())?;
    pretty_kv(w, "cyclic", cyclic_count(report).to_string())?;
    pretty_kv(w, "condensation edges", report.condensation_edges.to_string())?;
    for (idx, members) in report.components.iter().enumerate() {
        writeln!(w, "  C{idx:<4} [{}]", join_ids(members))?;
    }
    writeln!(w)?;

    pretty_section(w, "Order")?;
    pretty_kv(w, "components", join_ids(&report.component_order))?;
    pretty_kv(w, "tasks", join_ids(&report.task_order))?;
    writeln!(w)?;

    pretty_section(
        w,
        &format!(
            "Shortest distances from vertex {} (C{})",
            report.source, report.source_component
        ),
    )?;
    for (c, d) in report.shortest_distances.iter().enumerate() {
        writeln!(w, "  C{c:<4} {}", fmt_distance(*d))?;
    }
    writeln!(w)?;

    pretty_section(w, "Critical path")?;
    pretty_kv(w, "length", report.critical_path.length.to_string())?;
    pretty_kv(w, "components", join_ids(&report.critical_path.path))?;
    pretty_kv(w, "tasks", join_ids(&report.critical_tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgraph_core::TaskGraph;

    fn sample_report() -> AnalysisReport {
        let g = TaskGraph::from_edges(
            5,
            &[(0, 1, 1.0), (1, 0, 1.0), (1, 2, 4.0), (3, 4, 2.0)],
        )
        .expect("graph");
        let a = analyze(&g, 0).expect("analysis");
        AnalysisReport::new(&g, &a)
    }

    #[test]
    fn text_lists_every_component_and_unreachable_distances() {
        let report = sample_report();
        let mut buf = Vec::new();
        render_text(&report, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("vertices=5 edges=4 components=4 cyclic=1"));
        assert_eq!(text.matches("component ").count(), 4);
        assert_eq!(text.matches("unreachable").count(), 2);
        assert!(text.contains("critical_length=4"));
    }

    #[test]
    fn pretty_has_all_sections() {
        let report = sample_report();
        let mut buf = Vec::new();
        render_pretty(&report, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");

        for heading in ["Graph", "Strongly connected components", "Order", "Critical path"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Shortest distances from vertex 0"));
    }

    #[test]
    fn stage_counters_written_one_per_line() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_stage_counters(&mut buf, &report.counters).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("scc") && text.contains("visits="));
    }
}
