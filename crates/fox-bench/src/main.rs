use std::path::PathBuf;

use clap::Parser;

use fox_bench::config::{BenchConfig, ResolvedOutputs};
use fox_bench::logging::init_logging;
use fox_bench::tournament::TournamentRunner;
use fox_core::AppInfo;

/// Headless match harness for Fox in the Forest players.
#[derive(Debug, Parser)]
#[command(
    name = "fox-bench",
    author,
    version,
    about = "Deterministic two-player match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of deals to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Play each deal once instead of once per seating.
    #[arg(long)]
    no_swap: bool,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if cli.no_swap {
        config.games.swap_seats = false;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let seatings = config.games.seatings().len();
    let names = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!(
        "{} {}: loaded configuration '{run_id}': {names} ({games} deals × {seatings} seatings)",
        AppInfo::name(),
        AppInfo::version()
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        if let Some(avg) = outputs.summary.search.avg_iterations {
            println!(
                "  Searches: {} logged, {avg:.0} iterations on average",
                outputs.summary.search.count
            );
        }
    }

    Ok(())
}
