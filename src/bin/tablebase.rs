use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use retrograde::config::{SolverConfig, SolverMode};
use retrograde::generate::{Generator, Solved};
use retrograde::report::{GenerationReport, SolveReport};
use retrograde::rules::chess::ChessRules;
use retrograde::rules::Rules;
use retrograde::solve::probe;
use retrograde::TablebaseError;

/// Generate pawnless chess endgame tablebases by retrograde analysis.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rows: Option<u8>,

    #[arg(long)]
    cols: Option<u8>,

    /// Pieces per configuration, kings included
    #[arg(short, long)]
    pieces: Option<usize>,

    /// Non-royal piece pool, e.g. "qQrR"
    #[arg(long)]
    non_royal: Option<String>,

    #[arg(short, long)]
    threads: Option<usize>,

    /// Solve with this many message-passing workers instead of the shared-memory solver
    #[arg(short, long)]
    workers: Option<usize>,

    /// Enumerate the whole board even where reflections would allow less
    #[arg(long)]
    no_symmetry: bool,

    /// Print the forced line from the deepest win of every configuration
    #[arg(long)]
    probe: bool,
}

#[derive(Serialize)]
struct ProbeReport {
    configuration: String,
    plies: u16,
    positions: Vec<String>,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    report: GenerationReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    probes: Vec<ProbeReport>,
}

fn settings(args: &Args) -> Result<SolverConfig, TablebaseError> {
    let mut cfg = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(rows) = args.rows {
        cfg.rows = rows;
    }
    if let Some(cols) = args.cols {
        cfg.cols = cols;
    }
    if let Some(pieces) = args.pieces {
        cfg.pieces = pieces;
    }
    if let Some(pool) = &args.non_royal {
        cfg.non_royal = pool.clone();
    }
    if let Some(threads) = args.threads {
        cfg.threads = threads;
    }
    if let Some(workers) = args.workers {
        cfg.mode = SolverMode::Distributed { workers };
    }
    if args.no_symmetry {
        cfg.symmetry = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn deepest_line(
    rules: &ChessRules,
    solved: &Solved<()>,
) -> Result<Option<ProbeReport>, TablebaseError> {
    let table = &solved.table;
    // Ties are broken by rendering so the printed line is stable across runs.
    let deepest = table
        .wins
        .iter()
        .filter_map(|p| table.depth(p).map(|d| (d, p.render(rules.board()), p)))
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
    let Some((_, _, start)) = deepest else {
        return Ok(None);
    };
    let line = probe(rules, table, start)?;
    Ok(Some(ProbeReport {
        configuration: solved.configuration.to_string(),
        plies: line.plies,
        positions: line
            .positions
            .iter()
            .map(|p| {
                let mover = if p.side_to_move { "first" } else { "second" };
                format!("{mover} to move\n{}", p.render(rules.board()))
            })
            .collect(),
    }))
}

fn run(args: Args) -> Result<Output, TablebaseError> {
    let cfg = settings(&args)?;
    let rules = ChessRules::new(cfg.geometry());
    let generator = Generator::new(rules, cfg)?;
    let solved = generator.run()?;

    let mut probes = Vec::new();
    if args.probe {
        for s in &solved {
            if let Some(line) = deepest_line(generator.rules(), s)? {
                probes.push(line);
            }
        }
    }

    let cfg = generator.config();
    let report = GenerationReport {
        board: cfg.geometry(),
        mode: match cfg.mode {
            SolverMode::Shared => format!("shared ({} threads)", cfg.threads),
            SolverMode::Distributed { workers } => format!("distributed ({workers} workers)"),
        },
        configurations: solved.iter().map(SolveReport::new).collect(),
    };
    Ok(Output { report, probes })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(out) => match serde_json::to_string_pretty(&out) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("failed to serialize report: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e @ TablebaseError::InvalidConfig { .. }) | Err(e @ TablebaseError::Json(_)) => {
            error!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
