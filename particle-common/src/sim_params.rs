use serde::{Deserialize, Serialize};
use crate::config::{DirectionModel, DomainShape};

/// Simulation parameters derived from the configuration, used frequently during simulation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Domain
    pub domain_shape: DomainShape,
    pub domain_size: f64,

    // Particle Properties
    pub particle_radius: f64,
    pub velocity_half_range: f64,

    // Energy Exchange
    pub exchange_enabled: bool,
    pub initial_energy: f64,
    pub energy_quantum: f64,
    pub direction_model: DirectionModel,
}
