use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hillside_app::{
    ControlCommand, ControlHandle, TickScheduler, create_command_bus, make_command_submit, share,
};
use hillside_core::{Algorithm, RunState, Simulation, SimulationConfig, catalog};
use serde::Serialize;
use tracing::{info, warn};

const COMMAND_QUEUE_CAPACITY: usize = 64;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(
    name = "hillside",
    version,
    about = "Watch search agents descend a 2D cost landscape"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in landscapes.
    Landscapes,
    /// Run one search to its iteration budget and print a summary.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Catalog landscape to search.
    #[arg(long, env = "HILLSIDE_LANDSCAPE", default_value = "bowl")]
    landscape: String,
    /// JSON file with a base configuration; flags below override it.
    #[arg(long, env = "HILLSIDE_CONFIG")]
    config: Option<PathBuf>,
    /// hill_climbing, greedy, simulated_annealing or genetic.
    #[arg(long, env = "HILLSIDE_ALGORITHM")]
    algorithm: Option<Algorithm>,
    #[arg(long)]
    step_size: Option<f64>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    max_iterations: Option<u64>,
    /// Seed for a reproducible run.
    #[arg(long, env = "HILLSIDE_SEED")]
    seed: Option<u64>,
    /// Milliseconds between ticks; 0 runs flat out.
    #[arg(long, env = "HILLSIDE_TICK_MS", default_value_t = 10)]
    tick_ms: u64,
    /// Log progress every N iterations (0 disables).
    #[arg(long, default_value_t = 50)]
    progress_every: u64,
    /// Write the final snapshot as JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(step_size) = self.step_size {
            config.step_size = step_size;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(population_size) = self.population_size {
            config.population_size = population_size;
        }
        if let Some(mutation_rate) = self.mutation_rate {
            config.mutation_rate = mutation_rate;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if self.seed.is_some() {
            config.rng_seed = self.seed;
        }

        config.validate().context("configuration rejected")?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct RunSummary {
    landscape: String,
    algorithm: Algorithm,
    iterations: u64,
    best_x: Option<f64>,
    best_y: Option<f64>,
    best_value: Option<f64>,
    final_cost: Option<f64>,
    known_minimum: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Landscapes => list_landscapes(),
        Command::Run(args) => run(&args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_landscapes() -> Result<()> {
    for landscape in catalog::all() {
        let b = landscape.bounds();
        println!(
            "{:<16} [{}, {}] x [{}, {}]  {}",
            landscape.name(),
            b.min_x,
            b.max_x,
            b.min_y,
            b.max_y,
            landscape.description()
        );
    }
    Ok(())
}

fn run(args: &RunArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let Some(landscape) = catalog::by_name(&args.landscape) else {
        bail!(
            "unknown landscape '{}' (expected one of: {})",
            args.landscape,
            catalog::NAMES.join(", ")
        );
    };
    let known_minimum = landscape.global_min().value;
    let max_iterations = config.max_iterations;

    info!(
        landscape = landscape.name(),
        algorithm = %config.algorithm,
        max_iterations,
        "starting run"
    );
    let mut simulation =
        Simulation::new(landscape, config).context("failed to initialise simulation")?;
    simulation.start().context("failed to start simulation")?;

    let shared = share(simulation);
    let (sender, receiver) = create_command_bus(COMMAND_QUEUE_CAPACITY);
    let control = ControlHandle::new(shared.clone(), make_command_submit(sender));
    let scheduler = TickScheduler::spawn(
        shared.clone(),
        receiver,
        Duration::from_millis(args.tick_ms),
    )
    .context("failed to spawn scheduler thread")?;

    let mut last_reported = 0;
    let snapshot = loop {
        thread::sleep(POLL_INTERVAL);
        let snapshot = control.snapshot()?;
        if args.progress_every > 0 && snapshot.iteration >= last_reported + args.progress_every {
            last_reported = snapshot.iteration;
            info!(
                iteration = snapshot.iteration,
                cost = snapshot.history.last().map(|point| point.cost),
                best = snapshot.best_point.map(|best| best.value),
                "progress"
            );
        }
        if snapshot.state == RunState::Idle {
            break snapshot;
        }
    };

    if control.send(ControlCommand::Shutdown).is_err() {
        warn!("scheduler did not accept shutdown command");
    }
    scheduler.shutdown();

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
    }

    let summary = RunSummary {
        landscape: snapshot.landscape.clone(),
        algorithm: snapshot.algorithm,
        iterations: snapshot.iteration,
        best_x: snapshot.best_point.map(|best| best.x),
        best_y: snapshot.best_point.map(|best| best.y),
        best_value: snapshot.best_point.map(|best| best.value),
        final_cost: snapshot.history.last().map(|point| point.cost),
        known_minimum,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if snapshot.iteration < max_iterations {
        bail!(
            "run halted at iteration {} of {max_iterations}; see log for the failing tick",
            snapshot.iteration
        );
    }
    Ok(())
}
