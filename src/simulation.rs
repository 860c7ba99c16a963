use crate::collision::{find_contacting_pairs, ContactPair};
use crate::domain::{resolve_boundary, Domain};
use crate::exchange::EnergyExchange;
use crate::particle::{pair_mut, Particle};
use anyhow::Result;
use log::{debug, info, trace, warn};
use particle_common::{SimParams, SimulationConfig, Snapshot};
use rand::prelude::*;

/// What a single `step()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Step number after this call (the first call returns 1).
    pub step: u64,
    pub contact_pairs: usize,
    /// Transfers applied; 0 when the run carries no energy.
    pub exchanges: usize,
}

/// Owns the population and advances it one tick at a time.
pub struct Simulation {
    /// The simulation configuration, including initial conditions and parameters.
    config: SimulationConfig,
    params: SimParams,
    domain: Domain,
    particles: Vec<Particle>,
    exchange: Option<EnergyExchange>,
    /// Drives initial placement and every exchange direction, so one seed fixes the run.
    rng: StdRng,
    current_step: u64,
    last_contact_pairs: usize,
    /// Stores collected snapshots at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl Simulation {
    /// Validates the configuration and places the initial population.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.initial_conditions.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let params = config.get_sim_params();
        let domain = Domain::from_params(&params);
        let exchange = EnergyExchange::from_params(&params);

        if params.particle_radius > 0.0 && matches!(domain, Domain::Circle { .. }) {
            warn!(
                "Circle domain ignores particle radius {} at the boundary; only the center is kept inside.",
                params.particle_radius
            );
        }
        if config.particles.count == 0 {
            warn!("Population is empty; steps will do nothing.");
        }
        if exchange.is_some() && params.particle_radius == 0.0 {
            warn!("Energy exchange is enabled but particle radius is 0; no contacts can occur.");
        }

        let energy = exchange.map(|_| params.initial_energy);
        let particles = (0..config.particles.count)
            .map(|_| {
                Particle::spawn(
                    &domain,
                    params.particle_radius,
                    params.velocity_half_range,
                    energy,
                    &mut rng,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Placed {} particles in a {:?} domain of size {}.",
            particles.len(),
            domain.shape(),
            domain.extent()
        );
        debug!("Simulation Parameters: {:#?}", params);

        Ok(Self {
            config,
            params,
            domain,
            particles,
            exchange,
            rng,
            current_step: 0,
            last_contact_pairs: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Builds a stepper around a hand-placed population.
    ///
    /// Every particle must carry energy when `exchange` is set, and none may
    /// when it is not.
    pub fn from_particles(
        domain: Domain,
        particles: Vec<Particle>,
        exchange: Option<EnergyExchange>,
        seed: u64,
    ) -> Result<Self> {
        let extent = domain.extent();
        if !extent.is_finite() || extent <= 0.0 {
            anyhow::bail!("domain extent must be positive and finite (got {}).", extent);
        }
        let mut radius = 0.0;
        let mut half_range: f64 = 0.0;
        let mut energy_sum = 0.0;
        for (idx, p) in particles.iter().enumerate() {
            if !p.radius.is_finite() || p.radius < 0.0 {
                anyhow::bail!("particle {} has invalid radius {}.", idx, p.radius);
            }
            if matches!(domain, Domain::Rectangle { .. }) && 2.0 * p.radius > extent {
                anyhow::bail!("particle {} radius {} does not fit the domain.", idx, p.radius);
            }
            if !p.position.is_finite() || !p.velocity.is_finite() {
                anyhow::bail!("particle {} has a non-finite position or velocity.", idx);
            }
            match (p.energy, exchange.is_some()) {
                (Some(e), true) if !(0.0..=1.0).contains(&e) => {
                    anyhow::bail!("particle {} energy {} outside [0, 1].", idx, e);
                }
                (Some(_), true) | (None, false) => {}
                (None, true) => {
                    anyhow::bail!("particle {} carries no energy but energy exchange is enabled.", idx);
                }
                (Some(_), false) => {
                    anyhow::bail!("particle {} carries energy but energy exchange is disabled.", idx);
                }
            }
            radius = f64::max(radius, p.radius);
            half_range = p.velocity.x.abs().max(p.velocity.y.abs()).max(half_range);
            energy_sum += p.energy.unwrap_or_default();
        }

        let mut config = match exchange {
            Some(rule) => {
                let mut c = SimulationConfig::energy_exchange(particles.len() as u32);
                if let Some(ex) = c.exchange.as_mut() {
                    ex.quantum = rule.quantum;
                    ex.direction = rule.model;
                    // Mean of the placed energies stands in for the spawn energy.
                    if !particles.is_empty() {
                        ex.initial_energy = energy_sum / particles.len() as f64;
                    }
                }
                c
            }
            None => SimulationConfig::boundary_only(domain.shape(), particles.len() as u32),
        };
        config.domain.shape = domain.shape();
        config.domain.size = extent;
        config.particles.radius = radius;
        config.particles.velocity_half_range = half_range;
        // The caller drives stepping and recording.
        config.timing.total_steps = 0;
        config.timing.record_interval_steps = 1;
        config.initial_conditions.seed = Some(seed);
        let params = config.get_sim_params();

        Ok(Self {
            config,
            params,
            domain,
            particles,
            exchange,
            rng: StdRng::seed_from_u64(seed),
            current_step: 0,
            last_contact_pairs: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the population by one tick:
    /// move and resolve every particle, find contacts on the moved population,
    /// exchange energy per pair in index order, then clamp all energies.
    pub fn step(&mut self) -> StepReport {
        // --- 1. Move + Boundary ---
        for particle in self.particles.iter_mut() {
            particle.advance();
            resolve_boundary(&self.domain, particle);
        }

        // --- 2. Contact Detection ---
        let pairs = find_contacting_pairs(&self.particles);

        // --- 3. Energy Exchange ---
        let mut exchanges = 0;
        if let Some(rule) = self.exchange {
            for &ContactPair { i, j } in &pairs {
                let (a, b) = pair_mut(&mut self.particles, i, j);
                rule.apply(a, b, &mut self.rng);
                exchanges += 1;
            }
        }

        // --- 4. Energy Clamp ---
        for particle in self.particles.iter_mut() {
            particle.clamp_energy();
        }

        self.current_step += 1;
        self.last_contact_pairs = pairs.len();
        trace!(
            "Step {}: {} contact pairs, {} exchanges.",
            self.current_step,
            pairs.len(),
            exchanges
        );

        StepReport {
            step: self.current_step,
            contact_pairs: pairs.len(),
            exchanges,
        }
    }

    /// Calculates metrics for the current state and stores them as a snapshot.
    pub fn record_snapshot(&mut self) -> &Snapshot {
        let energies: Vec<f64> = self.particles.iter().filter_map(|p| p.energy).collect();
        let has_energy = self.exchange.is_some() && !energies.is_empty();
        let total = energies.iter().sum::<f64>();

        let snapshot = Snapshot {
            step: self.current_step,
            particle_count: self.particles.len() as u32,
            contact_pairs: self.last_contact_pairs as u32,
            total_energy: has_energy.then_some(total),
            mean_energy: has_energy.then(|| total / energies.len() as f64),
            min_energy: has_energy.then(|| energies.iter().copied().fold(f64::INFINITY, f64::min)),
            max_energy: has_energy.then(|| energies.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            positions: self
                .config
                .output
                .save_positions_in_snapshot
                .then(|| self.positions()),
            energies: (self.config.output.save_energies_in_snapshot && has_energy)
                .then_some(energies),
        };
        debug!(
            "Snapshot at step {}: {} particles, {} contacts, mean energy {:?}.",
            snapshot.step, snapshot.particle_count, snapshot.contact_pairs, snapshot.mean_energy
        );
        self.recorded_snapshots.push(snapshot);
        &self.recorded_snapshots[self.recorded_snapshots.len() - 1]
    }

    /// Returns a reference to the vector of recorded snapshots.
    pub fn recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.particles.iter().map(|p| (p.position.x, p.position.y)).collect()
    }

    /// Per-particle energies; `None` for runs without exchange.
    pub fn energies(&self) -> Option<Vec<f64>> {
        self.exchange
            .and_then(|_| self.particles.iter().map(|p| p.energy).collect())
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn exchange(&self) -> Option<&EnergyExchange> {
        self.exchange.as_ref()
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
