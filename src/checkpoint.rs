//! Checkpoint I/O (spec.md §4.8/§6): the whole collective's field particles
//! are gathered into a rank-0 buffer and written to a single `plot/NNNN.dat`
//! file, `bincode`-encoded, where `NNNN` is the checkpoint index zero-padded
//! to four digits. Grounded on vicseksim-rs's `io::bin::save_file`/
//! `load_file` for the encode/decode shape, generalized with a gather/
//! scatter pair so every rank's particles round-trip through one file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::communication::Communicator;
use crate::domain::Domain;
use crate::error::CheckpointError;
use crate::particle::Particle;

const TAG_CHECKPOINT_GATHER: i32 = 300;
const TAG_CHECKPOINT_SCATTER: i32 = 301;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub iteration: u64,
    pub time: f64,
    pub particles: Vec<Particle>,
}

/// Only field particles are persisted; virtual mirrors and halo copies are
/// regenerated every step and would just be dead weight in the file.
pub fn collect_checkpoint(iteration: u64, time: f64, particles: &[Particle]) -> Checkpoint {
    Checkpoint {
        iteration,
        time,
        particles: particles.iter().filter(|p| p.is_field()).copied().collect(),
    }
}

/// Collect every rank's owned particles onto rank 0 ("`collect_checkpoint`
/// gathers the owned field particles into a rank-0 buffer", spec.md §6).
/// Returns the full collective's particles on rank 0 and an empty `Vec`
/// everywhere else.
pub fn gather_to_rank0<C: Communicator<Particle>>(comm: &mut C, owned: &[Particle]) -> Vec<Particle> {
    if comm.is_main() {
        let mut all: Vec<Particle> = owned.to_vec();
        for peer in comm.other_ranks() {
            all.extend(comm.receive_vec(peer, TAG_CHECKPOINT_GATHER));
        }
        all
    } else {
        comm.send_vec(0, TAG_CHECKPOINT_GATHER, owned.to_vec());
        Vec::new()
    }
}

/// The inverse of [`gather_to_rank0`], used by restart: rank 0 holds the
/// whole collective's particles after reading the checkpoint file and hands
/// each one to the rank that owns its x-coordinate today. Returns this
/// rank's share.
pub fn scatter_from_rank0<C: Communicator<Particle>>(comm: &mut C, all: Vec<Particle>) -> Vec<Particle> {
    if comm.is_main() {
        let size = comm.size();
        let mut per_rank: Vec<Vec<Particle>> = (0..size).map(|_| Vec::new()).collect();
        for p in all {
            let owner = Domain::owning_rank_for(p.pos.x, size);
            per_rank[owner].push(p);
        }
        for (rank, bucket) in per_rank.iter().enumerate().skip(1) {
            comm.send_vec(rank as i32, TAG_CHECKPOINT_SCATTER, bucket.clone());
        }
        per_rank.into_iter().next().unwrap_or_default()
    } else {
        comm.receive_vec(0, TAG_CHECKPOINT_SCATTER)
    }
}

pub fn checkpoint_path(dir: &Path, checkpoint_index: u64) -> PathBuf {
    dir.join(format!("{checkpoint_index:04}.dat"))
}

/// Writes the shared checkpoint file. Only rank 0 should call this — every
/// other rank's particles already reached rank 0 via [`gather_to_rank0`].
pub fn write_checkpoint(dir: &Path, checkpoint_index: u64, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
    std::fs::create_dir_all(dir).map_err(|source| CheckpointError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = checkpoint_path(dir, checkpoint_index);
    let bytes = bincode::serialize(checkpoint).map_err(|source| CheckpointError::Encode {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, bytes).map_err(|source| CheckpointError::Write { path, source })
}

/// Reads the shared checkpoint file. Only rank 0 should call this — callers
/// scatter the result back out with [`scatter_from_rank0`].
pub fn restart_checkpoint(dir: &Path, checkpoint_index: u64) -> Result<Checkpoint, CheckpointError> {
    let path = checkpoint_path(dir, checkpoint_index);
    let bytes = std::fs::read(&path).map_err(|source| CheckpointError::Read { path: path.clone(), source })?;
    bincode::deserialize(&bytes).map_err(|source| CheckpointError::Decode { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::get_local_communicators;
    use crate::particle::ParticleId;
    use crate::vector::Vec2;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let particles = vec![
            Particle::new_field(ParticleId(0), Vec2::new(0.1, 0.2), 1.0, 1000.0, 5.0),
            Particle::new_field(ParticleId(1), Vec2::new(0.3, 0.4), 1.0, 998.0, 4.0),
        ];
        let checkpoint = collect_checkpoint(12, 0.05, &particles);
        write_checkpoint(dir.path(), 0, &checkpoint).unwrap();
        let restored = restart_checkpoint(dir.path(), 0).unwrap();
        assert_eq!(restored.iteration, 12);
        assert_eq!(restored.particles.len(), 2);
        assert_eq!(restored.particles[0].id, ParticleId(0));
    }

    #[test]
    fn virtual_and_halo_particles_are_excluded() {
        let field = Particle::new_field(ParticleId(0), Vec2::ZERO, 1.0, 1000.0, 0.0);
        let mirror = field.mirror(Vec2::ZERO, Vec2::ZERO);
        let halo = field.into_halo();
        let checkpoint = collect_checkpoint(0, 0.0, &[field, mirror, halo]);
        assert_eq!(checkpoint.particles.len(), 1);
    }

    #[test]
    fn missing_checkpoint_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = restart_checkpoint(dir.path(), 7).unwrap_err();
        assert!(matches!(err, CheckpointError::Read { .. }));
    }

    #[test]
    fn gather_combines_every_ranks_particles_onto_rank0() {
        let mut comms = get_local_communicators::<Particle>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();
        let owned0 = vec![Particle::new_field(ParticleId(0), Vec2::new(0.1, 0.1), 1.0, 1000.0, 0.0)];
        let owned1 = vec![Particle::new_field(ParticleId(1), Vec2::new(0.9, 0.1), 1.0, 1000.0, 0.0)];

        let t0 = std::thread::spawn(move || gather_to_rank0(&mut comm0, &owned0));
        let t1 = std::thread::spawn(move || gather_to_rank0(&mut comm1, &owned1));
        let gathered0 = t0.join().unwrap();
        let gathered1 = t1.join().unwrap();

        assert_eq!(gathered0.len(), 2);
        assert!(gathered1.is_empty());
    }

    #[test]
    fn scatter_routes_each_particle_to_its_owning_rank() {
        let mut comms = get_local_communicators::<Particle>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();
        let all = vec![
            Particle::new_field(ParticleId(0), Vec2::new(0.1, 0.1), 1.0, 1000.0, 0.0),
            Particle::new_field(ParticleId(1), Vec2::new(0.9, 0.1), 1.0, 1000.0, 0.0),
        ];

        let t0 = std::thread::spawn(move || scatter_from_rank0(&mut comm0, all));
        let t1 = std::thread::spawn(move || scatter_from_rank0(&mut comm1, Vec::new()));
        let rank0_share = t0.join().unwrap();
        let rank1_share = t1.join().unwrap();

        assert_eq!(rank0_share.len(), 1);
        assert_eq!(rank0_share[0].id, ParticleId(0));
        assert_eq!(rank1_share.len(), 1);
        assert_eq!(rank1_share[0].id, ParticleId(1));
    }
}
