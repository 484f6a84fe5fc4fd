//! Crowd Evacuation Simulator
//!
//! Runs one evacuation and prints its completion record as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use evac_core::output::SnapshotWriter;
use evac_core::{EvacConfig, SimError, Simulation};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "evac_sim")]
#[command(about = "Crowd evacuation simulation with optional leaders")]
struct Args {
    /// TOML configuration file (defaults to ./tuning.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of pedestrians
    #[arg(long)]
    pedestrians: Option<usize>,

    /// Number of leaders
    #[arg(long)]
    leaders: Option<usize>,

    /// Run without leaders
    #[arg(long)]
    no_leaders: bool,

    /// Give up after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write a world snapshot every N ticks (requires --snapshots)
    #[arg(long, default_value_t = 1)]
    snapshot_every: u64,

    /// JSONL file receiving world snapshots
    #[arg(long)]
    snapshots: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<EvacConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => EvacConfig::from_file(path)?,
        None => EvacConfig::load_or_default()?,
    };

    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(pedestrians) = args.pedestrians {
        config.population.pedestrians = pedestrians;
    }
    if let Some(leaders) = args.leaders {
        config.population.leaders = leaders;
    }
    if args.no_leaders {
        config.population.use_leaders = false;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.simulation.max_ticks = max_ticks;
    }

    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    tracing::info!(
        seed = config.simulation.seed,
        leaders = config.population.effective_leaders(),
        pedestrians = config.population.pedestrians,
        "starting evacuation"
    );

    let started = Instant::now();
    let mut simulation = Simulation::from_config(&config)?;

    let mut writer = match &args.snapshots {
        Some(path) => SnapshotWriter::new(path)?,
        None => SnapshotWriter::null(),
    };
    let recording = args.snapshots.is_some();
    let every = args.snapshot_every.max(1);

    if recording {
        let initial = simulation.snapshot();
        writer.write(&initial)?;
    }

    let outcome = simulation.run_to_completion_with(config.simulation.max_ticks, |sim| {
        if !recording {
            return;
        }
        if sim.tick() % every == 0 || sim.is_done() {
            let snapshot = sim.snapshot();
            if let Err(e) = writer.write(&snapshot) {
                tracing::warn!(tick = sim.tick(), error = %e, "could not write snapshot");
            }
        }
    })?;

    writer.flush()?;
    if recording {
        tracing::info!(count = writer.count(), "snapshots written");
    }

    let outcome = outcome.with_wall_clock(started.elapsed().as_secs_f64());
    println!("{}", outcome.to_json_pretty()?);
    Ok(())
}
