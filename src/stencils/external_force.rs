//! External force stencil (spec.md §4.3, `ext_force` in the original
//! source): gravity, applied to field particles only.

use crate::config;
use crate::particle::Particle;
use crate::vector::Vec2;

/// Writes `external_accel` for every field particle to `(0, -g)`; virtual
/// particles never move under gravity, so their external force stays zero.
pub fn external_force(particles: &mut [Particle]) {
    let gravity = Vec2::new(0.0, -config::GRAVITY);
    for p in particles.iter_mut() {
        p.external_accel = if p.is_field() { gravity } else { Vec2::ZERO };
    }
}
