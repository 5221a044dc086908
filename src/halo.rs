//! Cross-rank halo exchange (spec.md §4.6, `border_exchange` in the
//! original source): ranks trade read-only copies of the field particles
//! near their shared subdomain boundary so the kernel sees a complete
//! neighborhood on both sides of the cut.
//!
//! Each direction is a count-negotiate-then-payload handshake. Point-to-point
//! `send_vec`/`receive_vec` can deadlock if both ranks in a pair call send
//! before either calls receive, so sends and receives are staggered by rank
//! parity rather than relying on a `Sendrecv`-style primitive.

use crate::communication::Communicator;
use crate::domain::Domain;
use crate::particle::Particle;

const TAG_HALO_COUNT: i32 = 100;
const TAG_HALO_PAYLOAD: i32 = 101;

/// Particles a neighbor across `lo`/`hi` needs a copy of: anything within `r`
/// of the boundary it shares with that neighbor, field or locally generated
/// virtual mirror alike (spec.md §4.6 step 1 / Invariant 3 — a virtual mirror
/// can sit near a subdomain seam just as easily as a field particle, and the
/// neighbor has no way to regenerate it on its own). Halo copies already
/// imported from some other rank are excluded so they are never re-exported.
fn boundary_slice(field: &[Particle], boundary_x: f64, r: f64) -> Vec<Particle> {
    field
        .iter()
        .filter(|p| !p.is_halo() && (p.pos.x - boundary_x).abs() <= r)
        .copied()
        .collect()
}

fn exchange_with<C: Communicator<Particle>>(comm: &mut C, peer: i32, rank: i32, outgoing: Vec<Particle>) -> Vec<Particle> {
    let send_first = rank % 2 == 0;
    let mut count_buf = [outgoing.len() as u64];

    if send_first {
        comm.send_vec(peer, TAG_HALO_COUNT, vec![count_buf[0]]);
        count_buf = [comm.receive_vec(peer, TAG_HALO_COUNT)[0]];
        comm.send_vec(peer, TAG_HALO_PAYLOAD, outgoing);
        comm.receive_vec(peer, TAG_HALO_PAYLOAD)
    } else {
        let incoming_count = comm.receive_vec(peer, TAG_HALO_COUNT)[0];
        comm.send_vec(peer, TAG_HALO_COUNT, vec![count_buf[0]]);
        let incoming = comm.receive_vec(peer, TAG_HALO_PAYLOAD);
        comm.send_vec(peer, TAG_HALO_PAYLOAD, outgoing);
        debug_assert_eq!(incoming.len() as u64, incoming_count);
        incoming
    }
}

/// Exchange halo particles with both real neighbors and return them,
/// already relabeled [`Particle::into_halo`]. Endpoints skip the direction
/// that has no real neighbor (spec.md §4.6 endpoint guard).
pub fn exchange_halos<C: Communicator<Particle>>(comm: &mut C, domain: &Domain, field: &[Particle], r: f64) -> Vec<Particle> {
    let mut halos = Vec::new();

    if domain.has_real_west_neighbor() {
        let outgoing = boundary_slice(field, domain.lo, r);
        let incoming = exchange_with(comm, domain.west() as i32, domain.rank as i32, outgoing);
        halos.extend(incoming.into_iter().map(Particle::into_halo));
    }
    if domain.has_real_east_neighbor() {
        let outgoing = boundary_slice(field, domain.hi, r);
        let incoming = exchange_with(comm, domain.east() as i32, domain.rank as i32, outgoing);
        halos.extend(incoming.into_iter().map(Particle::into_halo));
    }

    halos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::get_local_communicators;
    use crate::config;
    use crate::particle::ParticleId;
    use crate::vector::Vec2;

    #[test]
    fn boundary_slice_only_keeps_particles_within_radius() {
        let r = config::interaction_radius();
        let field = vec![
            Particle::new_field(ParticleId(0), Vec2::new(0.0, 0.1), 1.0, 1000.0, 0.0),
            Particle::new_field(ParticleId(1), Vec2::new(r * 5.0, 0.1), 1.0, 1000.0, 0.0),
        ];
        let near = boundary_slice(&field, 0.0, r);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id, ParticleId(0));
    }

    #[test]
    fn boundary_slice_includes_virtual_mirrors_but_not_halo_copies() {
        let r = config::interaction_radius();
        let field_particle = Particle::new_field(ParticleId(0), Vec2::new(r * 0.1, 0.1), 1.0, 1000.0, 0.0);
        let mirror = field_particle.mirror(Vec2::new(-r * 0.1, 0.1), Vec2::ZERO);
        let halo_copy = field_particle.mirror(Vec2::new(r * 0.1, 0.2), Vec2::ZERO).into_halo();
        let field = vec![field_particle, mirror, halo_copy];
        let near = boundary_slice(&field, 0.0, r);
        assert_eq!(near.len(), 2);
        assert!(near.iter().any(|p| p.is_field()));
        assert!(near.iter().any(|p| p.is_virtual()));
        assert!(!near.iter().any(|p| p.is_halo()));
    }

    #[test]
    fn two_rank_exchange_hands_each_side_the_others_boundary_particles() {
        let r = config::interaction_radius();
        let domains = vec![Domain::new(0, 2), Domain::new(1, 2)];
        let mut comms: Vec<_> = get_local_communicators::<Particle>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();

        let field0 = vec![Particle::new_field(
            ParticleId(0),
            Vec2::new(domains[0].hi - r * 0.1, 0.1),
            1.0,
            1000.0,
            0.0,
        )];
        let field1 = vec![Particle::new_field(
            ParticleId(1),
            Vec2::new(domains[1].lo + r * 0.1, 0.1),
            1.0,
            1000.0,
            0.0,
        )];

        let d0 = domains[0];
        let d1 = domains[1];
        let t0 = std::thread::spawn(move || exchange_halos(&mut comm0, &d0, &field0, r));
        let t1 = std::thread::spawn(move || exchange_halos(&mut comm1, &d1, &field1, r));
        let halos0 = t0.join().unwrap();
        let halos1 = t1.join().unwrap();

        assert_eq!(halos0.len(), 1);
        assert_eq!(halos0[0].id, ParticleId(1));
        assert!(halos0[0].is_halo());
        assert_eq!(halos1.len(), 1);
        assert_eq!(halos1[0].id, ParticleId(0));
    }
}
