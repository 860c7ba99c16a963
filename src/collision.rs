use crate::particle::Particle;
use serde::{Deserialize, Serialize};

/// Two particles in contact, identified by population index with `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactPair {
    pub i: usize,
    pub j: usize,
}

/// Exhaustive pairwise scan in index order: `(0,1), (0,2), ..., (1,2), ...`.
///
/// A pair is in contact when the distance between centers is strictly less
/// than the sum of radii, so zero-radius particles never touch, even when
/// they coincide.
pub fn find_contacting_pairs(particles: &[Particle]) -> Vec<ContactPair> {
    let mut pairs = Vec::new();
    for (i, a) in particles.iter().enumerate() {
        for (offset, b) in particles[i + 1..].iter().enumerate() {
            let reach = a.radius + b.radius;
            // Compare squared distances; a zero reach can never satisfy `<`.
            if reach > 0.0 && a.position.distance_squared(b.position) < reach * reach {
                pairs.push(ContactPair { i, j: i + 1 + offset });
            }
        }
    }
    pairs
}
