//! Bounded 2D particle-motion kernel: kinematics, boundary reflection,
//! pairwise contact detection and on-contact energy exchange.

pub mod collision;
pub mod domain;
pub mod exchange;
pub mod particle;
pub mod simulation;

pub use collision::{find_contacting_pairs, ContactPair};
pub use domain::{resolve_boundary, Domain};
pub use exchange::{Direction, EnergyExchange};
pub use particle::Particle;
pub use simulation::{Simulation, StepReport};
