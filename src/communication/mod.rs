//! Communicator abstraction (spec.md §4.6/§4.7/§6): point-to-point
//! send/receive keyed by peer+tag, plus the broadcast and barrier the
//! driver needs, with a real-MPI backend and an in-process mpsc backend
//! behind the same trait set. Grounded on the teacher's split between
//! `mpi_world` and `local`, simplified to the point-to-point and
//! collective operations this solver actually issues.

mod collective_communicator;
mod communicator;
mod data_by_rank;
mod sized_communicator;

pub use collective_communicator::CollectiveCommunicator;
pub use communicator::Communicator;
pub use data_by_rank::DataByRank;
pub use sized_communicator::{Rank, SizedCommunicator};

#[cfg(feature = "local")]
mod local;
#[cfg(feature = "local")]
pub use local::{get_local_communicators, LocalCommunicator};

#[cfg(feature = "mpi")]
mod mpi_world;
#[cfg(feature = "mpi")]
pub use mpi_world::{MpiWorld, MPI_UNIVERSE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WorldRank(pub Rank);

impl WorldRank {
    pub fn is_main(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NumRanks(pub usize);
