//! The particle record (spec.md §3) and the external "particle store"
//! collaborator contract (spec.md §6).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vector::Vec2;

/// Global, stable identifier. Unique per process at any instant and globally
/// unique across the collective (spec.md §3 Invariant 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Type tag values. "Reserved" values other than these are accepted but
/// unused by any stencil.
pub mod particle_type {
    pub const FIELD: i8 = 2;
    pub const VIRTUAL: i8 = -2;
    /// Read-only copy of a neighboring rank's field particle, received over
    /// the halo exchange (spec.md §4.6). Participates in kernel pairs like a
    /// field particle but is never integrated, migrated, or checkpointed.
    pub const HALO: i8 = -1;
}

/// A single SPH particle, field or ghost. `Clone + Copy` because stencils
/// repeatedly re-fetch records by flat-array index rather than holding
/// references (spec.md §9 "Raw pointer aliasing").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub density: f64,
    pub pressure: f64,
    pub mass: f64,
    pub smoothing_length: f64,
    pub particle_type: i8,

    // Per-step scratch, recomputed every step.
    pub drho_dt: f64,
    pub internal_accel: Vec2,
    pub external_accel: Vec2,
    pub accel: Vec2,
    pub neighbor_count: u32,
    pub kernel_sum: f64,
    pub density_correction: f64,
}

impl Particle {
    pub fn new_field(id: ParticleId, pos: Vec2, mass: f64, density: f64, pressure: f64) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            density,
            pressure,
            mass,
            smoothing_length: crate::config::H,
            particle_type: particle_type::FIELD,
            drho_dt: 0.0,
            internal_accel: Vec2::ZERO,
            external_accel: Vec2::ZERO,
            accel: Vec2::ZERO,
            neighbor_count: 0,
            kernel_sum: 0.0,
            density_correction: 0.0,
        }
    }

    pub fn is_field(&self) -> bool {
        self.particle_type == particle_type::FIELD
    }

    /// A local solid-wall mirror (spec.md §4.5), as opposed to a remote
    /// halo copy.
    pub fn is_virtual(&self) -> bool {
        self.particle_type == particle_type::VIRTUAL
    }

    pub fn is_halo(&self) -> bool {
        self.particle_type == particle_type::HALO
    }

    /// Relabel a field particle received from a neighboring rank as a halo
    /// copy: it keeps its own position and velocity but is marked read-only
    /// so the local driver never integrates or migrates it.
    pub fn into_halo(mut self) -> Particle {
        self.particle_type = particle_type::HALO;
        self
    }

    /// Build a virtual mirror copy of `self`, reflecting position/velocity
    /// as given by the caller (spec.md §4.5).
    pub fn mirror(&self, mirrored_pos: Vec2, mirrored_vel: Vec2) -> Particle {
        Particle {
            id: self.id,
            pos: mirrored_pos,
            vel: mirrored_vel,
            density: self.density,
            pressure: self.pressure,
            mass: self.mass,
            smoothing_length: self.smoothing_length,
            particle_type: particle_type::VIRTUAL,
            drho_dt: 0.0,
            internal_accel: Vec2::ZERO,
            external_accel: Vec2::ZERO,
            accel: Vec2::ZERO,
            neighbor_count: 0,
            kernel_sum: 0.0,
            density_correction: 0.0,
        }
    }
}

/// The particle-owned hash/dictionary container used by the host process.
/// spec.md §1 places the storage format itself out of scope; this trait is
/// the narrow interface the driver marshals through (spec.md §6).
pub trait ParticleStore {
    fn init(&mut self);
    fn finalize(&mut self);
    fn insert(&mut self, particle: Particle);
    fn remove(&mut self, id: ParticleId);
    fn count(&self) -> usize;
    /// Populate `out` with references to every owned particle, unspecified order.
    fn list(&self, out: &mut Vec<Particle>);
}

/// A minimal `ParticleStore` keyed by global id, sufficient to run the solver
/// standalone. The real backing store is an external collaborator
/// (spec.md §1); this is the reference stand-in.
#[derive(Default)]
pub struct HashMapParticleStore {
    particles: HashMap<ParticleId, Particle>,
}

impl ParticleStore for HashMapParticleStore {
    fn init(&mut self) {
        self.particles.clear();
    }

    fn finalize(&mut self) {
        self.particles.clear();
    }

    fn insert(&mut self, particle: Particle) {
        self.particles.insert(particle.id, particle);
    }

    fn remove(&mut self, id: ParticleId) {
        self.particles.remove(&id);
    }

    fn count(&self) -> usize {
        self.particles.len()
    }

    fn list(&self, out: &mut Vec<Particle>) {
        out.clear();
        out.extend(self.particles.values().copied());
    }
}
