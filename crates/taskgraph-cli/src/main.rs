#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "taskgraph: scheduling analysis for weighted task graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit per-stage counters and command time to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format (default: pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Project config file (default: ./taskgraph.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze a task graph",
        long_about = "Find strongly connected components, order the condensation, and compute \
                      shortest distances from the source plus the critical path.",
        after_help = "EXAMPLES:\n    # Analyze a dataset\n    taskgraph analyze data/small_mixed.json\n\n    # Pick the source vertex\n    taskgraph analyze data/small_dag.json --source 3\n\n    # Emit machine-readable output\n    taskgraph analyze data/small_dag.json --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Generate the standard datasets",
        long_about = "Write the nine synthetic reference datasets as JSON files.",
        after_help = "EXAMPLES:\n    # Write datasets to ./data with the default seed\n    taskgraph generate\n\n    # Choose directory and seed\n    taskgraph generate --out-dir /tmp/graphs --seed 7"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        about = "Export a task graph as Graphviz DOT",
        after_help = "EXAMPLES:\n    # Render the task graph\n    taskgraph dot data/small_cycle.json | dot -Tsvg > graph.svg\n\n    # Render one node per component\n    taskgraph dot data/small_cycle.json --condensed"
    )]
    Dot(cmd::dot::DotArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    taskgraph completions bash > ~/.local/share/bash-completion/completions/taskgraph"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Analyze(_) => "cmd.analyze",
            Self::Generate(_) => "cmd.generate",
            Self::Dot(_) => "cmd.dot",
            Self::Completions(_) => "cmd.completions",
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskgraph=debug,info"
        } else {
            "taskgraph=info,warn"
        })
    });

    let format = env::var("TASKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let settings = config::load_settings(cli.config.as_deref(), &project_root)?;
    let output = output::resolve_output_mode(cli.format, cli.json, settings.format.as_deref());

    let name = cli.command.name();
    let started = Instant::now();
    let command_result = match cli.command {
        Commands::Analyze(ref args) => {
            cmd::analyze::run_analyze(args, &settings, output, cli.timing)
        }
        Commands::Generate(ref args) => cmd::generate::run_generate(args, &settings, output),
        Commands::Dot(ref args) => cmd::dot::run_dot(args),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if cli.timing {
        eprintln!("{name}: {}ns", started.elapsed().as_nanos());
    }

    command_result
}
