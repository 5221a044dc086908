//! Per-step neighbor bookkeeping (spec.md §4.1/§4.2, `find_neighbors`/
//! `find_neighbors_buckets_ws` in the original source): every pair the
//! neighbor search finds increments the kernel-sum and neighbor-count
//! scratch fields at both endpoints.
//!
//! The original zeroes and fills `INTER`/`WSUM` in the neighbor-search
//! function itself, unconditionally every step, before `correction` (which
//! only runs for `timestep > 0`) ever reads them. `internal_force`'s
//! free-surface check reads `INTER` on every step including step 0, so this
//! has to run unconditionally too rather than only as a side effect of
//! `density_correction`.

use crate::pair::Pair;
use crate::particle::Particle;
use crate::scatter::{scatter_count, scatter_scalar};

/// Populate `kernel_sum` and `neighbor_count` for every particle in the flat
/// array from the freshly built pair list, and clear `density_correction`
/// (AVRHO) ready for `correction` to accumulate into.
pub fn accumulate_neighbor_stats(particles: &mut [Particle], pairs: &[Pair]) {
    let n = particles.len();
    let kernel_sum = scatter_scalar(n, pairs, |pair, acc| {
        acc[pair.i] += pair.w;
        acc[pair.j] += pair.w;
    });
    let neighbor_count = scatter_count(n, pairs, |pair, acc| {
        acc[pair.i] += 1;
        acc[pair.j] += 1;
    });
    for ((p, w), c) in particles.iter_mut().zip(kernel_sum).zip(neighbor_count) {
        p.kernel_sum = w;
        p.neighbor_count = c;
        p.density_correction = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleId;
    use crate::vector::Vec2;

    #[test]
    fn pair_increments_both_endpoints() {
        let mut particles = vec![
            Particle::new_field(ParticleId(0), Vec2::ZERO, 1.0, 1000.0, 0.0),
            Particle::new_field(ParticleId(1), Vec2::new(0.01, 0.0), 1.0, 1000.0, 0.0),
        ];
        let mut pair = Pair::new(0, 1, 0.01, 0.1);
        pair.w = 50.0;
        accumulate_neighbor_stats(&mut particles, &[pair]);
        assert_eq!(particles[0].neighbor_count, 1);
        assert_eq!(particles[1].neighbor_count, 1);
        assert_eq!(particles[0].kernel_sum, 50.0);
        assert_eq!(particles[1].kernel_sum, 50.0);
    }

    #[test]
    fn untouched_particle_has_zero_stats() {
        let mut particles = vec![Particle::new_field(ParticleId(0), Vec2::ZERO, 1.0, 1000.0, 0.0)];
        accumulate_neighbor_stats(&mut particles, &[]);
        assert_eq!(particles[0].neighbor_count, 0);
        assert_eq!(particles[0].kernel_sum, 0.0);
    }
}
