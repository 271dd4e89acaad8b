use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_core::{build_initial_state, run_to_horizon, SimState, TickReport};
use sim_world::{
    generate_transitions, load_scenario, write_run_info, write_scenario, ScenarioFile,
    TransitionPreset,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use uuid::Uuid;

mod export;

use export::EnterpriseLog;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "sim_cli", about = "Production-flow simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario to its horizon and export the event and enterprise logs.
    Run(RunArgs),
    /// Write a scenario file with a generated transition matrix.
    GenerateConfig(GenerateArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the scenario JSON file.
    #[arg(long)]
    scenario: PathBuf,
    /// RNG seed. Drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the scenario horizon.
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long, default_value = "runs")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = 10_000)]
    print_every: u64,
    /// Write every tick to the enterprise log, not only ticks the event log refers to.
    #[arg(long)]
    every_tick: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetKind {
    Uniform,
    UniformUpperTriangle,
    UniformCorridor,
    UniformPercentage,
    Random,
    RandomUpperTriangle,
    RandomCorridor,
    RandomPercentage,
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[arg(long)]
    stations: usize,
    #[arg(long, value_enum)]
    preset: PresetKind,
    /// Corridor start, as an offset from the current station.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    left: i64,
    /// Corridor end, as an offset from the current station.
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    right: i64,
    /// Share of non-zero cells for the percentage presets.
    #[arg(long, default_value_t = 0.5)]
    percentage: f64,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "scenarios")]
    output_dir: PathBuf,
}

impl GenerateArgs {
    fn preset(&self) -> TransitionPreset {
        let (left, right, percentage) = (self.left, self.right, self.percentage);
        match self.preset {
            PresetKind::Uniform => TransitionPreset::Uniform,
            PresetKind::UniformUpperTriangle => TransitionPreset::UniformUpperTriangle,
            PresetKind::UniformCorridor => TransitionPreset::UniformCorridor { left, right },
            PresetKind::UniformPercentage => TransitionPreset::UniformPercentage { percentage },
            PresetKind::Random => TransitionPreset::Random,
            PresetKind::RandomUpperTriangle => TransitionPreset::RandomUpperTriangle,
            PresetKind::RandomCorridor => TransitionPreset::RandomCorridor { left, right },
            PresetKind::RandomPercentage => TransitionPreset::RandomPercentage { percentage },
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn create_run_dir(output_dir: &Path, name: &str, seed: u64) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let dir = output_dir.join(format!("{name}_{timestamp}_seed{seed}"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn run(args: &RunArgs) -> Result<PathBuf> {
    let mut config = load_scenario(&args.scenario)?;
    if let Some(ticks) = args.ticks {
        config.horizon_ticks = ticks;
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut state = build_initial_state(&config, seed).context("building initial state")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let name = args
        .scenario
        .file_stem()
        .map_or_else(|| "scenario".into(), |stem| stem.to_string_lossy());
    let run_dir = create_run_dir(&args.output_dir, &name, seed)?;
    let run_id = Uuid::new_v4().to_string();
    write_run_info(
        &run_dir,
        &run_id,
        seed,
        &config,
        serde_json::json!({
            "runner": "sim_cli",
            "scenario": args.scenario.display().to_string(),
            "print_every": args.print_every,
            "every_tick": args.every_tick,
        }),
    )?;
    std::fs::copy(&args.scenario, run_dir.join("scenario.json")).context("copying scenario file")?;

    tracing::info!(%run_id, seed, horizon = config.horizon_ticks, "run started");
    println!("Run directory: {}", run_dir.display());
    println!(
        "Starting simulation: ticks={} seed={seed} stations={} resources={}",
        config.horizon_ticks,
        config.stations.len(),
        config.resources.len(),
    );
    println!("{}", "-".repeat(80));

    let print_every = args.print_every;
    let mut enterprise = EnterpriseLog::new(config.stations.len(), config.resources.len());
    run_to_horizon(&mut state, &config, &mut rng, |state, report| {
        enterprise.record(&report.snapshot);
        if print_every > 0 && report.tick % print_every == 0 {
            print_status(state, report);
        }
    })
    .context("simulation aborted")?;

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.meta.tick);
    println!(
        "  completed={} in_flight={}",
        state.completed.len(),
        state.orders.len()
    );

    let visits = export::reconstruct_visits(&state.completed, &state.resources);
    export::write_event_log(&run_dir.join("event_log.csv"), &visits)?;
    let only_ticks = (!args.every_tick).then(|| export::event_ticks(&visits));
    let rows = enterprise.write(&run_dir.join("enterprise_log.csv"), only_ticks.as_ref())?;
    export::write_parameters(&run_dir, &config)?;

    tracing::info!(
        %run_id,
        completed = state.completed.len(),
        visits = visits.len(),
        enterprise_rows = rows,
        "run finished"
    );
    Ok(run_dir)
}

fn print_status(state: &SimState, report: &TickReport) {
    let snapshot = &report.snapshot;
    println!(
        "[tick={:06}]  active={:4}  completed={:5}  stations_free={}/{}  resources_free={}/{}",
        report.tick,
        snapshot.active_orders,
        snapshot.completed_orders,
        snapshot.stations_available,
        state.stations.len(),
        snapshot.resources_available,
        state.resources.len(),
    );
}

// ---------------------------------------------------------------------------
// Generate config
// ---------------------------------------------------------------------------

fn generate_config(args: &GenerateArgs) -> Result<PathBuf> {
    let preset = args.preset();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let transitions = generate_transitions(args.stations, preset, &mut rng)
        .with_context(|| format!("generating {} matrix", preset.label()))?;
    let scenario = ScenarioFile::with_transitions(transitions);
    scenario.clone().into_config().with_context(|| {
        format!(
            "{} matrix with seed {seed} does not form a usable route graph",
            preset.label()
        )
    })?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    let path = args
        .output_dir
        .join(format!("{}_stations_{}.json", args.stations, preset.label()));
    write_scenario(&path, &scenario)?;
    tracing::info!(path = %path.display(), seed, "scenario written");
    println!("Wrote {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => {
            run(&args)?;
        }
        Commands::GenerateConfig(args) => {
            generate_config(&args)?;
        }
    }
    Ok(())
}
