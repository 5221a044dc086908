//! Particle migration across subdomain boundaries (spec.md §4.7,
//! `migrate_particles` in the original source): after integration moves a
//! field particle out of the x-range this rank owns, it is handed to the
//! rank that now owns it.

use crate::communication::Communicator;
use crate::domain::Domain;
use crate::particle::Particle;

const TAG_MIGRATE_COUNT: i32 = 200;
const TAG_MIGRATE_PAYLOAD: i32 = 201;

fn exchange_with<C: Communicator<Particle>>(comm: &mut C, peer: i32, rank: i32, outgoing: Vec<Particle>) -> Vec<Particle> {
    let send_first = rank % 2 == 0;
    if send_first {
        comm.send_vec(peer, TAG_MIGRATE_COUNT, vec![outgoing.len() as u64]);
        let incoming_count = comm.receive_vec(peer, TAG_MIGRATE_COUNT)[0];
        comm.send_vec(peer, TAG_MIGRATE_PAYLOAD, outgoing);
        let incoming = comm.receive_vec(peer, TAG_MIGRATE_PAYLOAD);
        debug_assert_eq!(incoming.len() as u64, incoming_count);
        incoming
    } else {
        let incoming_count = comm.receive_vec(peer, TAG_MIGRATE_COUNT)[0];
        comm.send_vec(peer, TAG_MIGRATE_COUNT, vec![outgoing.len() as u64]);
        let incoming = comm.receive_vec(peer, TAG_MIGRATE_PAYLOAD);
        comm.send_vec(peer, TAG_MIGRATE_PAYLOAD, outgoing);
        debug_assert_eq!(incoming.len() as u64, incoming_count);
        incoming
    }
}

/// Partition `field` into particles this rank keeps and particles that
/// crossed into a neighbor's subdomain, exchange the departed particles
/// with both real neighbors, and return the updated local set with the
/// rank's own particles plus whatever was received. Global ids travel with
/// their particle, so no identity bookkeeping is needed on either side.
pub fn migrate_particles<C: Communicator<Particle>>(comm: &mut C, domain: &Domain, field: Vec<Particle>) -> Vec<Particle> {
    let mut kept = Vec::with_capacity(field.len());
    let mut to_west = Vec::new();
    let mut to_east = Vec::new();

    for p in field {
        if !p.is_field() {
            kept.push(p);
            continue;
        }
        if domain.has_real_west_neighbor() && p.pos.x < domain.lo {
            to_west.push(p);
        } else if domain.has_real_east_neighbor() && p.pos.x >= domain.hi {
            to_east.push(p);
        } else {
            kept.push(p);
        }
    }

    if domain.has_real_west_neighbor() {
        let incoming = exchange_with(comm, domain.west() as i32, domain.rank as i32, to_west);
        kept.extend(incoming);
    }
    if domain.has_real_east_neighbor() {
        let incoming = exchange_with(comm, domain.east() as i32, domain.rank as i32, to_east);
        kept.extend(incoming);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::get_local_communicators;
    use crate::particle::ParticleId;
    use crate::vector::Vec2;

    #[test]
    fn particle_past_the_right_edge_migrates_east() {
        let domains = vec![Domain::new(0, 2), Domain::new(1, 2)];
        let mut comms: Vec<_> = get_local_communicators::<Particle>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();

        let crossed = Particle::new_field(ParticleId(5), Vec2::new(domains[0].hi + 1e-6, 0.1), 1.0, 1000.0, 0.0);
        let field0 = vec![crossed];
        let field1: Vec<Particle> = vec![];

        let d0 = domains[0];
        let d1 = domains[1];
        let t0 = std::thread::spawn(move || migrate_particles(&mut comm0, &d0, field0));
        let t1 = std::thread::spawn(move || migrate_particles(&mut comm1, &d1, field1));
        let kept0 = t0.join().unwrap();
        let kept1 = t1.join().unwrap();

        assert!(kept0.is_empty());
        assert_eq!(kept1.len(), 1);
        assert_eq!(kept1[0].id, ParticleId(5));
    }

    #[test]
    fn particle_inside_the_subdomain_stays_put() {
        let domain = Domain::new(0, 1);
        let mut comm = get_local_communicators::<Particle>(1).pop().unwrap();
        let p = Particle::new_field(ParticleId(1), Vec2::new(0.3, 0.1), 1.0, 1000.0, 0.0);
        let kept = migrate_particles(&mut comm, &domain, vec![p]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, ParticleId(1));
    }
}
