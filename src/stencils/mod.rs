//! The four per-step pair/particle stencils (spec.md §4.3: continuity,
//! density correction, internal force, external force) plus the neighbor
//! bookkeeping (spec.md §4.1/§4.2) they depend on. Each stencil reads the
//! kernel-evaluated pair list and the particle array and writes back
//! scratch fields (or, for density correction, `density` itself) on
//! [`crate::particle::Particle`]; none of them touch position or velocity
//! directly, that belongs to the integrator.

mod continuity;
mod correction;
mod external_force;
mod internal_force;
mod neighbor_stats;

pub use continuity::continuity;
pub use correction::density_correction;
pub use external_force::external_force;
pub use internal_force::internal_force;
pub use neighbor_stats::accumulate_neighbor_stats;
