//! Initial particle layout (SPEC_FULL.md §4 supplement, grounded on the
//! teacher's `initial_conditions.rs` plugin-free, and on `sph.c`'s
//! `initialize()` for the dam-break column geometry, hydrostatic pressure,
//! and uniform mass).
//!
//! Not declared out of scope by spec.md, and a runnable binary needs some
//! starting population: a regular grid of field particles filling the
//! initial fluid column `[0, L] x [0, T]`, spaced by `DELTA`, each assigned
//! to the rank that owns its x-coordinate.

use crate::config;
use crate::domain::Domain;
use crate::particle::{Particle, ParticleId};
use crate::vector::Vec2;

/// Build every field particle in the global dam-break column, keeping only
/// the ones this rank's `domain` owns. Global ids are assigned by grid
/// position so they are stable and identical across ranks regardless of
/// which rank actually keeps each particle.
pub fn generate_dam_break_column(domain: &Domain) -> Vec<Particle> {
    let nx = (config::L / config::DELTA).round() as u64;
    let ny = (config::T / config::DELTA).round() as u64;
    let mass = column_particle_mass(nx, ny);

    let mut particles = Vec::new();
    let mut id = 0u64;
    for iy in 0..ny {
        for ix in 0..nx {
            let pos = Vec2::new(ix as f64 * config::DELTA, iy as f64 * config::DELTA);
            if domain.owns_x(pos.x) {
                let pressure = hydrostatic_pressure(pos.y);
                particles.push(Particle::new_field(ParticleId(id), pos, mass, config::RHO_0, pressure));
            }
            id += 1;
        }
    }
    particles
}

/// Uniform particle mass so the column's total mass equals `L * T * rho0`,
/// per `sph.c` `initialize()`.
fn column_particle_mass(nx: u64, ny: u64) -> f64 {
    config::L * config::T * config::RHO_0 / (nx * ny) as f64
}

/// Hydrostatic pressure at height `y` under the free surface at `T`:
/// `P = rho0 * g * (T - y)`.
fn hydrostatic_pressure(y: f64) -> f64 {
    config::RHO_0 * config::GRAVITY * (config::T - y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rank_owns_every_particle_in_the_column() {
        let domain = Domain::new(0, 1);
        let particles = generate_dam_break_column(&domain);
        let nx = (config::L / config::DELTA).round() as u64;
        let ny = (config::T / config::DELTA).round() as u64;
        assert_eq!(particles.len() as u64, nx * ny);
    }

    #[test]
    fn column_splits_across_ranks_without_overlap_or_gaps() {
        let domains = [Domain::new(0, 2), Domain::new(1, 2)];
        let total: usize = domains.iter().map(|d| generate_dam_break_column(d).len()).sum();
        let whole = generate_dam_break_column(&Domain::new(0, 1)).len();
        assert_eq!(total, whole);
    }

    #[test]
    fn pressure_increases_with_depth() {
        let domain = Domain::new(0, 1);
        let particles = generate_dam_break_column(&domain);
        let bottom = particles.iter().find(|p| p.pos.y < config::DELTA).unwrap();
        let top = particles
            .iter()
            .filter(|p| p.pos.x == bottom.pos.x)
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap())
            .unwrap();
        assert!(bottom.pressure > top.pressure);
    }

    #[test]
    fn every_particle_gets_a_unique_global_id() {
        let domain = Domain::new(0, 1);
        let particles = generate_dam_break_column(&domain);
        let mut ids: Vec<u64> = particles.iter().map(|p| p.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), particles.len());
    }
}
