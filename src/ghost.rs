//! Virtual mirror particle generation (spec.md §4.5,
//! `generate_virtual_particles` in the original source).
//!
//! Every step, each field particle within `d = MIRROR_BOUNDARY_FACTOR * h`
//! of a solid wall spawns one mirror particle per wall it is close to (up
//! to two at once, at a corner). Mirrors are local and step-scoped: they
//! are never migrated, checkpointed, or carried into the next step.

use crate::config;
use crate::particle::Particle;
use crate::vector::Vec2;

/// Regenerate the mirror set for `field` from scratch. The returned `Vec`'s
/// capacity is pre-grown to `5 * field.len()`, the worst case of every
/// particle triggering every wall and both corner cases at once.
pub fn generate_virtual_particles(field: &[Particle]) -> Vec<Particle> {
    let d = config::MIRROR_BOUNDARY_FACTOR * config::H;
    let mut mirrors = Vec::with_capacity(5 * field.len());

    for p in field {
        if !p.is_field() {
            continue;
        }
        let near_left = p.pos.x < d;
        let near_right = p.pos.x > config::B - d;
        let near_bottom = p.pos.y < d;

        if near_left {
            mirrors.push(p.mirror(Vec2::new(-p.pos.x, p.pos.y), Vec2::new(-p.vel.x, p.vel.y)));
        }
        if near_right {
            mirrors.push(p.mirror(
                Vec2::new(2.0 * config::B - p.pos.x, p.pos.y),
                Vec2::new(-p.vel.x, p.vel.y),
            ));
        }
        if near_bottom {
            mirrors.push(p.mirror(Vec2::new(p.pos.x, -p.pos.y), Vec2::new(p.vel.x, -p.vel.y)));
        }
        if near_left && near_bottom {
            mirrors.push(p.mirror(Vec2::new(-p.pos.x, -p.pos.y), Vec2::new(-p.vel.x, -p.vel.y)));
        }
        if near_right && near_bottom {
            mirrors.push(p.mirror(
                Vec2::new(2.0 * config::B - p.pos.x, -p.pos.y),
                Vec2::new(-p.vel.x, -p.vel.y),
            ));
        }
    }

    mirrors
}
