//! `taskgraph generate`: Write the standard synthetic datasets.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use taskgraph_core::generate::{generate_graph, standard_presets};
use taskgraph_core::loader::GraphData;

use crate::config::Settings;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `taskgraph generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory to write `<name>.json` files into (created if missing).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// RNG seed; the same seed reproduces the same files.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct GeneratedDataset {
    name: String,
    path: PathBuf,
    vertices: usize,
    edges: usize,
    content_hash: String,
}

#[derive(Debug, Serialize)]
struct GenerateReport {
    seed: u64,
    out_dir: PathBuf,
    datasets: Vec<GeneratedDataset>,
}

/// Generate every preset from one seeded RNG, in preset order.
pub fn run_generate(args: &GenerateArgs, settings: &Settings, output: OutputMode) -> Result<()> {
    let seed = args.seed.unwrap_or(settings.seed);
    let out_dir = args.out_dir.clone().unwrap_or_else(|| settings.out_dir.clone());

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut datasets = Vec::new();
    for preset in standard_presets() {
        let graph = generate_graph(&preset, &mut rng);
        let path = out_dir.join(format!("{}.json", preset.name));
        let json = GraphData::from_graph(&graph, 0, &preset.weight_model).to_json_pretty()?;
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(name = %preset.name, path = %path.display(), edges = graph.edge_count(), "dataset written");
        datasets.push(GeneratedDataset {
            name: preset.name,
            path,
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            content_hash: graph.content_hash(),
        });
    }

    let report = GenerateReport {
        seed,
        out_dir,
        datasets,
    };
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &GenerateReport, w: &mut dyn Write) -> io::Result<()> {
    for d in &report.datasets {
        writeln!(
            w,
            "{} vertices={} edges={} path={}",
            d.name,
            d.vertices,
            d.edges,
            d.path.display()
        )?;
    }
    Ok(())
}

fn render_pretty(report: &GenerateReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Generated {} datasets in {} (seed {})",
            report.datasets.len(),
            report.out_dir.display(),
            report.seed
        ),
    )?;
    for d in &report.datasets {
        writeln!(w, "  {:<20} {:>4} vertices {:>5} edges", d.name, d.vertices, d.edges)?;
    }
    Ok(())
}
