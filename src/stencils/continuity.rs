//! Continuity equation (spec.md §4.3, `cont_density` in the original
//! source): accumulate `drho/dt` for every particle touched by at least one
//! pair.

use crate::pair::Pair;
use crate::particle::Particle;
use crate::scatter::scatter_scalar;

/// Writes `particles[k].drho_dt` for every `k`. Field and virtual particles
/// both participate (a virtual particle's density still needs to be
/// current for the pressure a field neighbor sees), only the later
/// integrator step restricts the actual density update to field particles.
pub fn continuity(particles: &mut [Particle], pairs: &[Pair]) {
    let n = particles.len();
    let drho = scatter_scalar(n, pairs, |pair, acc| {
        let pi = &particles[pair.i];
        let pj = &particles[pair.j];
        let vr = pi.vel - pj.vel;
        let contribution = vr.dot(pair.grad);
        acc[pair.i] += pi.density * (pj.mass / pj.density) * contribution;
        acc[pair.j] += pj.density * (pi.mass / pi.density) * contribution;
    });
    for (p, d) in particles.iter_mut().zip(drho) {
        p.drho_dt = d;
    }
}
