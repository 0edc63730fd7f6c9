//! Binary entry point for the Dinic step player.
#![forbid(unsafe_code)]

#[path = "dinitz/config.rs"]
mod config;

use std::collections::HashMap;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dinitz::{
    engine::{run_max_flow, DinitzRun, RunOptions},
    graph::{load_graph_csv, EdgeStore, GraphImportConfig, ImportedGraph},
    logging::init_logging,
    playback::{
        JsonRenderer, PlaybackOptions, PlaybackOutcome, Player, RunGate, StepRenderer,
        TextRenderer,
    },
    precheck::precheck,
    types::{format_amount, EdgeId, NodeIndex},
};
use serde::Serialize;
use tracing::{debug, warn};

use config::CliConfig;

const DEFAULT_DELAY_MS: u64 = 250;

#[derive(Parser, Debug)]
#[command(
    name = "dinitz",
    version,
    about = "Step through Dinic's maximum-flow algorithm on a CSV graph",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "DINITZ_CONFIG",
        value_name = "FILE",
        help = "CLI config file (TOML)"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Output format")]
    format: Option<OutputFormat>,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Log filter written to stderr (e.g. info, dinitz=debug)"
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GraphArgs {
    #[arg(value_name = "EDGES", help = "CSV file with from,to[,capacity][,flow] columns")]
    edges: PathBuf,

    #[arg(long, value_name = "FILE", help = "CSV file fixing node order (id column)")]
    nodes: Option<PathBuf>,

    #[arg(long, value_name = "ID", help = "Source node id")]
    source: Option<String>,

    #[arg(long, value_name = "ID", help = "Sink node id")]
    sink: Option<String>,

    #[arg(long, default_value = "from", help = "Edge tail column name")]
    from_column: String,

    #[arg(long, default_value = "to", help = "Edge head column name")]
    to_column: String,

    #[arg(long, default_value = "capacity", help = "Edge capacity column name")]
    capacity_column: String,
}

#[derive(Args, Debug)]
struct RunCmd {
    #[command(flatten)]
    graph: GraphArgs,

    #[arg(long, value_name = "MS", help = "Delay between steps in milliseconds")]
    delay_ms: Option<u64>,

    #[arg(long, value_name = "MS", help = "Extra delay after each phase")]
    phase_pause_ms: Option<u64>,

    #[arg(long, value_enum, help = "Colorize text output")]
    color: Option<ColorArg>,

    #[arg(long, value_name = "N", help = "Stop after N phases")]
    max_phases: Option<u32>,

    #[arg(long, help = "Skip the source/sink checks")]
    no_precheck: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Play the algorithm step by step")]
    Run(RunCmd),

    #[command(about = "Print the maximum flow and the resulting edge flows")]
    MaxFlow(GraphArgs),

    #[command(about = "Validate source and sink without running")]
    Check(GraphArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ColorArg {
    Auto,
    Always,
    Never,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32, Box<dyn Error>> {
    let cli = Cli::parse();
    let cfg = CliConfig::load(cli.config.clone())?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level)?;
    let format = cli.format.or(cfg.format).unwrap_or(OutputFormat::Text);

    match cli.command {
        Command::Run(cmd) => run_steps(cmd, &cfg, format).await,
        Command::MaxFlow(args) => max_flow(&args, format),
        Command::Check(args) => check(&args, format),
    }
}

async fn run_steps(
    cmd: RunCmd,
    cfg: &CliConfig,
    format: OutputFormat,
) -> Result<i32, Box<dyn Error>> {
    if let Some(path) = cfg.path() {
        debug!(path = %path.display(), "cli.config");
    }
    let mut imported = load(&cmd.graph)?;
    let terminals = resolve_terminals(&imported, &cmd.graph);
    let (source, sink) = if cmd.no_precheck {
        match terminals {
            (Some(s), Some(t)) => (s, t),
            _ => return report_precheck(format, "Please set both a source and a sink."),
        }
    } else {
        match precheck(&imported.graph, terminals.0, terminals.1) {
            Ok(pair) => pair,
            Err(err) => return report_precheck(format, &err.to_string()),
        }
    };

    let delay = cmd
        .delay_ms
        .map(Duration::from_millis)
        .or(cfg.delay)
        .unwrap_or(Duration::from_millis(DEFAULT_DELAY_MS));
    let phase_pause = cmd
        .phase_pause_ms
        .map(Duration::from_millis)
        .or(cfg.phase_pause)
        .unwrap_or_default();
    let color = match cmd.color.or(cfg.color).unwrap_or(ColorArg::Auto) {
        ColorArg::Always => true,
        ColorArg::Never => false,
        ColorArg::Auto => io::stdout().is_terminal(),
    };

    let names = edge_names(&imported);
    let node_names = imported.labels().to_vec();
    let gate = RunGate::new();
    let player = Player::new(PlaybackOptions::with_delay(delay).phase_pause(phase_pause))
        .with_ticket(gate.begin());
    let cancel = player.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping playback");
            cancel.cancel();
        }
    });

    let mut options = RunOptions::new();
    if let Some(phases) = cmd.max_phases {
        options = options.max_phases(phases);
    }
    let mut run = DinitzRun::with_options(&mut imported.graph, source, sink, options);
    let stdout = io::stdout();
    let mut renderer: Box<dyn StepRenderer> = match format {
        OutputFormat::Json => Box::new(JsonRenderer::new(stdout.lock())),
        OutputFormat::Text => Box::new(
            TextRenderer::new(stdout.lock())
                .colored(color)
                .with_names(node_names, names),
        ),
    };
    let outcome = player.play(&mut run, renderer.as_mut()).await?;
    drop(renderer);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&outcome)?),
        OutputFormat::Text => match outcome {
            PlaybackOutcome::Completed { max_flow, steps } => {
                println!("max flow {} ({steps} steps)", format_amount(max_flow))
            }
            PlaybackOutcome::Stopped { flow, steps } => println!(
                "phase cap reached, flow {} is not maximal ({steps} steps)",
                format_amount(flow)
            ),
            PlaybackOutcome::Cancelled { steps } | PlaybackOutcome::Superseded { steps } => {
                println!("stopped after {steps} steps")
            }
        },
    }
    Ok(match outcome {
        PlaybackOutcome::Completed { .. } | PlaybackOutcome::Stopped { .. } => 0,
        _ => 130,
    })
}

#[derive(Serialize)]
struct EdgeFlowReport {
    from: String,
    to: String,
    capacity: f64,
    flow: f64,
}

#[derive(Serialize)]
struct MaxFlowReport {
    max_flow: f64,
    edges: Vec<EdgeFlowReport>,
}

fn max_flow(args: &GraphArgs, format: OutputFormat) -> Result<i32, Box<dyn Error>> {
    let mut imported = load(args)?;
    let (source, sink) = resolve_terminals(&imported, args);
    let (source, sink) = match precheck(&imported.graph, source, sink) {
        Ok(pair) => pair,
        Err(err) => return report_precheck(format, &err.to_string()),
    };
    let value = run_max_flow(&mut imported.graph, source, sink);

    let edges = imported
        .graph
        .edges()
        .map(|(_, e)| EdgeFlowReport {
            from: node_label(&imported, e.from),
            to: node_label(&imported, e.to),
            capacity: e.capacity,
            flow: e.flow,
        })
        .collect();
    let report = MaxFlowReport {
        max_flow: value,
        edges,
    };
    emit(format, &report, || {
        println!("max flow {}", format_amount(report.max_flow));
        for edge in &report.edges {
            println!(
                "  {} -> {}: {} / {}",
                edge.from,
                edge.to,
                format_amount(edge.flow),
                format_amount(edge.capacity)
            );
        }
    })?;
    Ok(0)
}

fn check(args: &GraphArgs, format: OutputFormat) -> Result<i32, Box<dyn Error>> {
    let imported = load(args)?;
    let (source, sink) = resolve_terminals(&imported, args);
    match precheck(&imported.graph, source, sink) {
        Ok(_) => {
            emit(format, &serde_json::json!({ "ok": true }), || println!("ok"))?;
            Ok(0)
        }
        Err(err) => report_precheck(format, &err.to_string()),
    }
}

fn report_precheck(format: OutputFormat, message: &str) -> Result<i32, Box<dyn Error>> {
    emit(
        format,
        &serde_json::json!({ "ok": false, "error": message }),
        || eprintln!("{message}"),
    )?;
    Ok(2)
}

fn load(args: &GraphArgs) -> Result<ImportedGraph, Box<dyn Error>> {
    let mut cfg = GraphImportConfig::new(&args.edges);
    if let Some(nodes) = &args.nodes {
        cfg = cfg.nodes_path(nodes);
    }
    cfg.from_column = args.from_column.clone();
    cfg.to_column = args.to_column.clone();
    cfg.capacity_column = args.capacity_column.clone();
    Ok(load_graph_csv(&cfg)?)
}

fn resolve_terminals(
    imported: &ImportedGraph,
    args: &GraphArgs,
) -> (Option<NodeIndex>, Option<NodeIndex>) {
    let lookup = |id: &Option<String>| id.as_deref().and_then(|id| imported.index_of(id));
    (lookup(&args.source), lookup(&args.sink))
}

fn node_label(imported: &ImportedGraph, key: dinitz::NodeKey) -> String {
    imported
        .graph
        .index_of(key)
        .and_then(|i| imported.label(i))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

fn edge_names(imported: &ImportedGraph) -> HashMap<EdgeId, String> {
    imported
        .graph
        .edges()
        .map(|(id, e)| {
            (
                id,
                format!("{}->{}", node_label(imported, e.from), node_label(imported, e.to)),
            )
        })
        .collect()
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}
