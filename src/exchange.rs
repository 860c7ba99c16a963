use crate::particle::Particle;
use particle_common::{DirectionModel, SimParams};
use rand::Rng;
use rand_distr::StandardNormal;

/// Sign of an energy transfer: `a` loses `sign * quantum`, `b` gains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Negative,
    Zero,
    Positive,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Negative => -1.0,
            Direction::Zero => 0.0,
            Direction::Positive => 1.0,
        }
    }

    /// Sign of a sample; an exact zero stays `Zero`.
    pub fn from_sample(x: f64) -> Self {
        if x > 0.0 {
            Direction::Positive
        } else if x < 0.0 {
            Direction::Negative
        } else {
            Direction::Zero
        }
    }
}

/// Contact rule that trades a fixed quantum of energy between two particles.
/// Velocities are never touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyExchange {
    pub quantum: f64,
    pub model: DirectionModel,
}

impl Default for EnergyExchange {
    fn default() -> Self {
        Self { quantum: 0.1, model: DirectionModel::NormalSign }
    }
}

impl EnergyExchange {
    pub fn new(quantum: f64, model: DirectionModel) -> Self {
        Self { quantum, model }
    }

    /// `None` when the run has no energy exchange.
    pub fn from_params(params: &SimParams) -> Option<Self> {
        params
            .exchange_enabled
            .then(|| Self::new(params.energy_quantum, params.direction_model))
    }

    pub fn draw_direction<R: Rng>(&self, rng: &mut R) -> Direction {
        match self.model {
            DirectionModel::NormalSign => Direction::from_sample(rng.sample(StandardNormal)),
            DirectionModel::CoinFlip => {
                if rng.random_bool(0.5) {
                    Direction::Positive
                } else {
                    Direction::Negative
                }
            }
        }
    }

    /// Moves `direction * quantum` from `a` to `b` without clamping, so the
    /// pair's total is unchanged. Particles without energy are skipped.
    pub fn transfer(&self, a: &mut Particle, b: &mut Particle, direction: Direction) {
        let (Some(ea), Some(eb)) = (a.energy.as_mut(), b.energy.as_mut()) else {
            return;
        };
        let delta = direction.sign() * self.quantum;
        *ea -= delta;
        *eb += delta;
    }

    /// Draws a direction, transfers, and clamps both energies into [0, 1].
    pub fn apply<R: Rng>(&self, a: &mut Particle, b: &mut Particle, rng: &mut R) -> Direction {
        let direction = self.draw_direction(rng);
        self.transfer(a, b, direction);
        a.clamp_energy();
        b.clamp_energy();
        direction
    }
}
