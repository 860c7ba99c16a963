use crate::particle::Particle;
use anyhow::Result;
use particle_common::{angle_to_vec, clamp, DomainShape, SimParams, Vec2};
use rand::distr::Uniform;
use rand::Rng;

/// The bounded region particles move within. Immutable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Axis-aligned box `[0, size] x [0, size]`.
    Rectangle { size: f64 },
    /// Disk of the given diameter centered at `(diameter / 2, diameter / 2)`.
    Circle { diameter: f64 },
}

impl Domain {
    pub fn from_params(params: &SimParams) -> Self {
        match params.domain_shape {
            DomainShape::Rectangle => Domain::Rectangle { size: params.domain_size },
            DomainShape::Circle => Domain::Circle { diameter: params.domain_size },
        }
    }

    pub fn shape(&self) -> DomainShape {
        match self {
            Domain::Rectangle { .. } => DomainShape::Rectangle,
            Domain::Circle { .. } => DomainShape::Circle,
        }
    }

    /// Box side length or circle diameter.
    pub fn extent(&self) -> f64 {
        match *self {
            Domain::Rectangle { size } => size,
            Domain::Circle { diameter } => diameter,
        }
    }

    pub fn center(&self) -> Vec2 {
        let half = self.extent() / 2.0;
        Vec2::new(half, half)
    }

    /// Radius of the circular boundary (half the extent for either shape).
    pub fn radius(&self) -> f64 {
        self.extent() / 2.0
    }

    /// Containment test used after boundary resolution. `radius` is the
    /// particle's contact radius and only narrows the rectangle.
    pub fn contains(&self, position: Vec2, radius: f64, eps: f64) -> bool {
        match *self {
            Domain::Rectangle { size } => {
                (0..2).all(|axis| {
                    let p = position.axis(axis);
                    p >= radius - eps && p <= size - radius + eps
                })
            }
            Domain::Circle { .. } => position.distance(self.center()) <= self.radius() + eps,
        }
    }

    /// Draws an initial position.
    ///
    /// Rectangle: each coordinate uniform in `[0, size)`.
    /// Circle: uniform angle and a radius drawn uniformly on `[0, R)`. The radius
    /// is not area-weighted, so the sample concentrates toward the center.
    pub fn sample_position<R: Rng>(&self, rng: &mut R) -> Result<Vec2> {
        match *self {
            Domain::Rectangle { size } => {
                let coord = Uniform::new(0.0, size)?;
                Ok(Vec2::new(rng.sample(coord), rng.sample(coord)))
            }
            Domain::Circle { .. } => {
                let angle = rng.sample(Uniform::new(0.0, std::f64::consts::TAU)?);
                let r = rng.sample(Uniform::new(0.0, self.radius())?);
                Ok(self.center() + angle_to_vec(angle) * r)
            }
        }
    }
}

/// Detects and resolves wall contact for one particle.
pub fn resolve_boundary(domain: &Domain, particle: &mut Particle) {
    match *domain {
        Domain::Rectangle { size } => resolve_rectangle(size, particle),
        Domain::Circle { .. } => resolve_circle(domain.center(), domain.radius(), particle),
    }
}

/// Per-axis reflection: each touching axis has its velocity negated and its
/// coordinate clamped into `[radius, size - radius]`. Corners flip both axes.
fn resolve_rectangle(size: f64, particle: &mut Particle) {
    let r = particle.radius;
    for axis in 0..2 {
        let p = particle.position.axis(axis);
        if p - r <= 0.0 || p + r >= size {
            let v = particle.velocity.axis_mut(axis);
            *v = -*v;
            *particle.position.axis_mut(axis) = clamp(p, r, size - r);
        }
    }
}

/// Specular reflection about the outward normal, then projection onto the circle.
fn resolve_circle(center: Vec2, domain_radius: f64, particle: &mut Particle) {
    let offset = particle.position - center;
    let d = offset.length();
    if d < domain_radius {
        return;
    }
    // Normal is undefined at the center (only reachable with a zero radius).
    if d <= 0.0 {
        return;
    }
    let normal = offset.normalize_or_zero();
    let vn = particle.velocity.dot(normal);
    particle.velocity -= normal * (2.0 * vn);
    particle.position = center + normal * domain_radius;
}
