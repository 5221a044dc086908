//! Real MPI transport (feature `mpi`), backed by the `rsmpi` bindings.
//!
//! Grounded on the teacher's `mpi_world.rs`: a process-wide lazily
//! initialized `Universe`, one `MpiWorld<T>` per logical channel. Payloads
//! here are `bincode`-encoded byte buffers (matching the `local` backend and
//! the checkpoint format) rather than raw `Equivalence` buffers, so every
//! communicated type only needs `Serialize + DeserializeOwned`.

use std::marker::PhantomData;
use std::sync::Mutex;

use lazy_static::lazy_static;
use mpi::environment::Universe;
use mpi::point_to_point::{Destination, Source};
use mpi::topology::{Rank as MpiRank, SystemCommunicator};
use mpi::traits::Communicator as MpiCommunicatorTrait;
use mpi::traits::MatchedReceiveVec;
use mpi::Threading;
use serde::{de::DeserializeOwned, Serialize};

use super::collective_communicator::CollectiveCommunicator;
use super::communicator::Communicator;
use super::sized_communicator::{Rank, SizedCommunicator};

pub struct StaticUniverse(Mutex<Option<Universe>>);

impl StaticUniverse {
    pub fn world(&self) -> SystemCommunicator {
        self.0.lock().unwrap().as_ref().unwrap().world()
    }
}

lazy_static! {
    pub static ref MPI_UNIVERSE: StaticUniverse = {
        let (universe, _threading) = mpi::initialize_with_threading(Threading::Single)
            .expect("MPI failed to initialize");
        StaticUniverse(Mutex::new(Some(universe)))
    };
}

pub struct MpiWorld<T> {
    world: SystemCommunicator,
    marker: PhantomData<T>,
}

impl<T> MpiWorld<T> {
    pub fn new() -> Self {
        Self {
            world: MPI_UNIVERSE.world(),
            marker: PhantomData,
        }
    }
}

impl<T> Default for MpiWorld<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SizedCommunicator for MpiWorld<T> {
    fn rank(&self) -> Rank {
        self.world.rank()
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }
}

impl<T: Serialize + DeserializeOwned> Communicator<T> for MpiWorld<T> {
    fn send_vec(&mut self, rank: Rank, tag: i32, data: Vec<T>) {
        let bytes = bincode::serialize(&data).expect("payload failed to serialize");
        let process = self.world.process_at_rank(rank as MpiRank);
        process.send_with_tag(&bytes, tag);
    }

    fn receive_vec(&mut self, rank: Rank, tag: i32) -> Vec<T> {
        let process = self.world.process_at_rank(rank as MpiRank);
        let (bytes, _status) = process.matched_probe_with_tag(tag).matched_receive_vec();
        bincode::deserialize(&bytes).expect("malformed payload from peer rank")
    }
}

impl<T> CollectiveCommunicator for MpiWorld<T> {
    fn broadcast_bytes(&mut self, root: i32, data: &mut Vec<u8>) {
        let mut len = data.len() as u64;
        let root_process = self.world.process_at_rank(root as MpiRank);
        root_process.broadcast_into(&mut len);
        if self.world.rank() != root as MpiRank {
            data.resize(len as usize, 0);
        }
        root_process.broadcast_into(&mut data[..]);
    }

    fn barrier(&mut self) {
        self.world.barrier();
    }
}
