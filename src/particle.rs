use crate::domain::Domain;
use anyhow::Result;
use particle_common::{clamp, Vec2};
use rand::distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A point particle moving inside the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Contact radius. 0 for point particles that never touch.
    pub radius: f64,
    /// Scalar in [0, 1] traded on contact; `None` when the run has no exchange.
    pub energy: Option<f64>,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f64, energy: Option<f64>) -> Self {
        Self { position, velocity, radius, energy }
    }

    /// Places a particle at a random point of `domain` with velocity components
    /// drawn uniformly from `[-velocity_half_range, velocity_half_range]`.
    pub fn spawn<R: Rng>(
        domain: &Domain,
        radius: f64,
        velocity_half_range: f64,
        energy: Option<f64>,
        rng: &mut R,
    ) -> Result<Self> {
        let position = domain.sample_position(rng)?;
        let velocity_dist = Uniform::new_inclusive(-velocity_half_range, velocity_half_range)?;
        let velocity = Vec2::new(rng.sample(velocity_dist), rng.sample(velocity_dist));
        Ok(Self::new(position, velocity, radius, energy))
    }

    /// Moves the particle by one tick of its velocity. The result may lie
    /// outside the domain until the boundary is resolved.
    #[inline]
    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Pulls the energy back into [0, 1].
    #[inline]
    pub fn clamp_energy(&mut self) {
        if let Some(energy) = self.energy.as_mut() {
            *energy = clamp(*energy, 0.0, 1.0);
        }
    }

    /// RGB display color: red scales with energy, blue with its complement.
    pub fn color(&self) -> Option<[f64; 3]> {
        self.energy.map(|e| [e, 0.0, 1.0 - e])
    }
}

/// Borrows two distinct particles mutably at once. Requires `i < j`.
pub(crate) fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert!(i < j, "pair_mut requires i < j (got {i}, {j})");
    let (head, tail) = particles.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn advance_adds_velocity() {
        let mut p = Particle::new(Vec2::new(1.0, 2.0), Vec2::new(0.5, -0.25), 0.0, None);
        p.advance();
        assert_eq!(p.position, Vec2::new(1.5, 1.75));
        assert_eq!(p.velocity, Vec2::new(0.5, -0.25));
    }

    #[test]
    fn clamp_energy_rails() {
        let mut p = Particle::new(Vec2::zero(), Vec2::zero(), 0.1, Some(1.2));
        p.clamp_energy();
        assert_eq!(p.energy, Some(1.0));
        p.energy = Some(-0.1);
        p.clamp_energy();
        assert_eq!(p.energy, Some(0.0));

        let mut q = Particle::new(Vec2::zero(), Vec2::zero(), 0.0, None);
        q.clamp_energy();
        assert_eq!(q.energy, None);
    }

    #[test]
    fn color_tracks_energy() {
        let p = Particle::new(Vec2::zero(), Vec2::zero(), 0.1, Some(0.25));
        assert_eq!(p.color(), Some([0.25, 0.0, 0.75]));
        let q = Particle::new(Vec2::zero(), Vec2::zero(), 0.0, None);
        assert_eq!(q.color(), None);
    }

    #[test]
    fn spawn_respects_velocity_range() -> Result<()> {
        let domain = Domain::Rectangle { size: 10.0 };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Particle::spawn(&domain, 0.1, 0.05, Some(0.5), &mut rng)?;
            assert!(p.velocity.x.abs() <= 0.05 && p.velocity.y.abs() <= 0.05);
            assert!((0.0..=10.0).contains(&p.position.x));
            assert!((0.0..=10.0).contains(&p.position.y));
            assert_eq!(p.energy, Some(0.5));
        }
        Ok(())
    }

    #[test]
    fn spawn_with_zero_velocity_range_is_at_rest() -> Result<()> {
        let domain = Domain::Circle { diameter: 4.0 };
        let mut rng = StdRng::seed_from_u64(1);
        let p = Particle::spawn(&domain, 0.0, 0.0, None, &mut rng)?;
        assert_eq!(p.velocity, Vec2::zero());
        Ok(())
    }

    #[test]
    fn pair_mut_returns_both() {
        let mut particles = vec![
            Particle::new(Vec2::new(0.0, 0.0), Vec2::zero(), 0.1, Some(0.1)),
            Particle::new(Vec2::new(1.0, 0.0), Vec2::zero(), 0.1, Some(0.2)),
            Particle::new(Vec2::new(2.0, 0.0), Vec2::zero(), 0.1, Some(0.3)),
        ];
        let (a, b) = pair_mut(&mut particles, 0, 2);
        assert_eq!(a.energy, Some(0.1));
        assert_eq!(b.energy, Some(0.3));

        let (a, b) = pair_mut(&mut particles, 1, 2);
        a.energy = Some(0.0);
        b.energy = Some(0.5);
        assert_eq!(particles[1].energy, Some(0.0));
        assert_eq!(particles[2].energy, Some(0.5));
    }
}
