//! Internal (pressure) force stencil (spec.md §4.3, `int_force` in the
//! original source): the symmetric pressure-gradient term from the Tait
//! equation of state, with a free-surface guard against the tensile
//! instability that a naive pressure gradient produces near a free surface.

use crate::config;
use crate::pair::Pair;
use crate::particle::Particle;
use crate::scatter::scatter_vec2;

/// Writes `internal_accel` for every particle from the pressure-gradient
/// term. Field particles (the first `n_field` entries) with fewer
/// neighbors than `FREE_SURFACE_THRESHOLD` are treated as being on the free
/// surface: their density is reset to the reference density before the
/// equation of state runs, so the Tait pressure for those particles is
/// exactly zero rather than whatever compression or tension the kernel sum
/// would otherwise imply.
pub fn internal_force(particles: &mut [Particle], pairs: &[Pair], n_field: usize) {
    for p in particles[..n_field].iter_mut() {
        if (p.neighbor_count as usize) < config::FREE_SURFACE_THRESHOLD {
            p.density = config::RHO_0;
        }
    }
    for p in particles.iter_mut() {
        p.pressure = config::tait_pressure(p.density);
    }

    let n = particles.len();
    let accel = scatter_vec2(n, pairs, |pair, acc| {
        let pi = &particles[pair.i];
        let pj = &particles[pair.j];
        let term = pi.pressure / (pi.density * pi.density) + pj.pressure / (pj.density * pj.density);
        // grad points from j to i (delta = x_i - x_j); the force on i is
        // along -grad, and on j along +grad (Newton's third law).
        acc[pair.i] -= pair.grad * (pj.mass * term);
        acc[pair.j] += pair.grad * (pi.mass * term);
    });

    for (p, a) in particles.iter_mut().zip(accel) {
        p.internal_accel = a;
    }
}
