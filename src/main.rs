use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, error, info, trace, warn};
use particle_common::{DomainShape, SimulationConfig};
use particle_engine::Simulation;
use std::path::PathBuf;
use std::time::Instant;

/// Built-in configurations used when no config file is present.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Point particles bouncing off the boundary, no energy.
    Boundary,
    /// Finite-radius particles trading energy on contact.
    Energy,
}

/// Command-line arguments for the particle engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config.toml file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Preset to use if the config file does not exist
    #[arg(long, value_enum, default_value_t = Preset::Energy)]
    preset: Preset,

    /// Population size override; repeat (or comma-separate) to run several populations
    #[arg(short = 'n', long = "particles", value_delimiter = ',')]
    particles: Vec<u32>,

    /// Domain shape override (rectangle or circle)
    #[arg(long)]
    shape: Option<DomainShape>,

    /// Number of steps override
    #[arg(long)]
    steps: Option<u64>,

    /// RNG seed override
    #[arg(long)]
    seed: Option<u64>,
}

fn base_config(args: &Args) -> Result<SimulationConfig> {
    if args.config.exists() {
        info!("Loading configuration from {}", args.config.display());
        return SimulationConfig::load(&args.config);
    }
    warn!(
        "Config file '{}' not found, using the {:?} preset.",
        args.config.display(),
        args.preset
    );
    Ok(match args.preset {
        Preset::Boundary => SimulationConfig::boundary_only(DomainShape::Rectangle, 100),
        Preset::Energy => SimulationConfig::energy_exchange(300),
    })
}

fn run(config: SimulationConfig) -> Result<()> {
    let mut sim = Simulation::new(config)?;
    let total_steps = sim.config().timing.total_steps;
    let record_interval_steps = sim.config().timing.record_interval_steps;
    info!(
        "Running {} particles for {} steps, recording every {} steps.",
        sim.particle_count(),
        total_steps,
        record_interval_steps
    );

    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let print_interval_secs = 5.0;
    let mut total_contacts: u64 = 0;

    sim.record_snapshot();
    for _ in 0..total_steps {
        let step_start_time = Instant::now();
        let report = sim.step();
        total_contacts += report.contact_pairs as u64;

        let is_record_step = report.step % record_interval_steps == 0;
        let is_last_step = report.step == total_steps;
        if is_record_step || is_last_step {
            sim.record_snapshot();
        }

        let current_time = Instant::now();
        if current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs || is_last_step {
            info!(
                "Step [{}/{}] | Contacts: {} | Exchanges: {} | Elapsed: {:.2} s",
                report.step,
                total_steps,
                report.contact_pairs,
                report.exchanges,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;
        } else {
            trace!(
                "Step [{}/{}] completed in {:.3} ms",
                report.step,
                total_steps,
                step_start_time.elapsed().as_secs_f64() * 1000.0
            );
        }
    }

    let snapshots = sim.recorded_snapshots();
    debug!("Recorded {} snapshots.", snapshots.len());
    if let Some(last) = snapshots.last() {
        match (last.mean_energy, last.min_energy, last.max_energy) {
            (Some(mean), Some(min), Some(max)) => info!(
                "Finished {} steps in {:.3} s | {} contacts total | energy mean {:.3}, min {:.3}, max {:.3}",
                last.step,
                start_time.elapsed().as_secs_f64(),
                total_contacts,
                mean,
                min,
                max
            ),
            _ => info!(
                "Finished {} steps in {:.3} s | {} contacts total",
                last.step,
                start_time.elapsed().as_secs_f64(),
                total_contacts
            ),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Particle Engine...");

    let mut config = base_config(&args)?;
    if let Some(shape) = args.shape {
        config.domain.shape = shape;
    }
    if let Some(steps) = args.steps {
        config.timing.total_steps = steps;
    }
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = Some(seed);
    }

    let counts = if args.particles.is_empty() {
        vec![config.particles.count]
    } else {
        args.particles.clone()
    };

    for count in counts {
        let mut run_config = config.clone();
        run_config.particles.count = count;
        if let Err(e) = run_config.validate() {
            error!("Invalid configuration for {} particles: {}", count, e);
            return Err(e);
        }
        run(run_config)?;
    }

    info!("Simulation Complete.");
    Ok(())
}
