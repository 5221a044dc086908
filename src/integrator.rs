//! Predictor-corrector leapfrog time integration (spec.md §4.4, `time_step`
//! in the original source).
//!
//! Step 0 is a half-step predictor (no previous acceleration to average
//! against); every later step splits the leapfrog kick in two: a half-kick
//! plus full drift at the top of the step (using the acceleration the
//! previous step combined), then a second half-kick once the stencils have
//! recomputed it. Only field particles are advanced — virtual (mirror)
//! particles are regenerated fresh every step from their owning field
//! particle, never integrated.

use crate::config;
use crate::particle::Particle;
use crate::vector::Vec2;

/// Combine the internal and external force accumulators into the total
/// acceleration used by both halves of the leapfrog kick.
pub fn combine_acceleration(particles: &mut [Particle]) {
    for p in particles.iter_mut() {
        if p.is_field() {
            p.accel = p.internal_accel + p.external_accel;
        }
    }
}

/// Step >= 1 only: the half-kick + full-drift applied at the TOP of the
/// step, before the neighbor rebuild, using `accel` as combined by the
/// *previous* step's [`combine_acceleration`]/[`finish_step`] call.
pub fn kick_drift(particles: &mut [Particle], dt: f64) {
    for p in particles.iter_mut() {
        if !p.is_field() {
            continue;
        }
        p.vel += p.accel * (0.5 * dt);
        p.pos += p.vel * dt;
    }
}

/// The post-stencil completion shared by every step: advance density by the
/// continuity rate and apply the second half-kick. Step 0 has no prior
/// top-of-step drift, so it also performs the full-drift position update
/// here; later steps already drifted at the top and only finish the kick.
pub fn finish_step(particles: &mut [Particle], dt: f64, first_step: bool) {
    for p in particles.iter_mut() {
        if !p.is_field() {
            continue;
        }

        p.density += 0.5 * dt * p.drho_dt;
        p.pressure = config::tait_pressure(p.density);

        p.vel += p.accel * (0.5 * dt);
        if first_step {
            p.pos += p.vel * dt;
        }

        reflect(p);
    }
}

/// Reflective boundary conditions at the tank walls (spec.md §4.4): a
/// particle that has crossed a wall moving further into it has its
/// wall-normal velocity component flipped, for that step only.
fn reflect(p: &mut Particle) {
    if p.pos.y < 0.0 && p.vel.y < 0.0 {
        p.vel = Vec2::new(p.vel.x, -p.vel.y);
    }
    if p.pos.x > config::B && p.vel.x > 0.0 {
        p.vel = Vec2::new(-p.vel.x, p.vel.y);
    }
    if p.pos.x < 0.0 && p.vel.x < 0.0 {
        p.vel = Vec2::new(-p.vel.x, p.vel.y);
    }
}
