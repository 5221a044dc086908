//! In-process communicator backed by `std::sync::mpsc` channels (feature
//! `local`). Used for single-process runs and the test suite, standing in
//! for the real MPI transport so the rest of the solver never needs to know
//! which backend it's talking to.
//!
//! Unlike the teacher's raw-pointer byte reinterpretation, payloads here are
//! `bincode`-encoded through `serde`, matching the checkpoint format
//! elsewhere in this crate and avoiding the `unsafe` transmute the MPI path
//! cannot avoid (real MPI buffers have no such luxury).

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{de::DeserializeOwned, Serialize};

use super::collective_communicator::CollectiveCommunicator;
use super::communicator::Communicator;
use super::data_by_rank::DataByRank;
use super::sized_communicator::{Rank, SizedCommunicator};

struct Message {
    tag: i32,
    bytes: Vec<u8>,
}

pub struct LocalCommunicator<T> {
    senders: DataByRank<Sender<Message>>,
    receivers: DataByRank<Receiver<Message>>,
    pending: HashMap<(Rank, i32), Vec<Message>>,
    rank: Rank,
    size: usize,
    marker: PhantomData<T>,
}

impl<T> LocalCommunicator<T> {
    fn new(senders: DataByRank<Sender<Message>>, receivers: DataByRank<Receiver<Message>>, rank: Rank, size: usize) -> Self {
        Self {
            senders,
            receivers,
            pending: HashMap::new(),
            rank,
            size,
            marker: PhantomData,
        }
    }
}

/// Build one fully-connected mesh of `LocalCommunicator<T>`, one per rank,
/// for running the solver as `size` cooperating threads/tasks within a
/// single process.
pub fn get_local_communicators<T>(size: usize) -> Vec<LocalCommunicator<T>> {
    let mut senders: Vec<DataByRank<Sender<Message>>> = (0..size).map(|_| DataByRank::empty()).collect();
    let mut receivers: Vec<DataByRank<Receiver<Message>>> = (0..size).map(|_| DataByRank::empty()).collect();

    for i in 0..size {
        for j in 0..size {
            if i == j {
                continue;
            }
            let (tx, rx) = channel::<Message>();
            senders[i].insert(j as Rank, tx);
            receivers[j].insert(i as Rank, rx);
        }
    }

    (0..size)
        .map(|rank| {
            LocalCommunicator::new(
                std::mem::replace(&mut senders[rank], DataByRank::empty()),
                std::mem::replace(&mut receivers[rank], DataByRank::empty()),
                rank as Rank,
                size,
            )
        })
        .collect()
}

impl<T> SizedCommunicator for LocalCommunicator<T> {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl<T: Serialize + DeserializeOwned> Communicator<T> for LocalCommunicator<T> {
    fn send_vec(&mut self, rank: Rank, tag: i32, data: Vec<T>) {
        let bytes = bincode::serialize(&data).expect("checkpoint-format payload failed to serialize");
        self.senders
            .get(&rank)
            .expect("no channel to requested rank")
            .send(Message { tag, bytes })
            .expect("peer rank's receiver dropped");
    }

    fn receive_vec(&mut self, rank: Rank, tag: i32) -> Vec<T> {
        if let Some(stashed) = self.pending.get_mut(&(rank, tag)) {
            if let Some(msg) = stashed.pop() {
                return bincode::deserialize(&msg.bytes).expect("malformed payload from peer rank");
            }
        }
        let receiver = self.receivers.get(&rank).expect("no channel to requested rank");
        loop {
            let msg = receiver.recv().expect("peer rank's sender dropped");
            if msg.tag == tag {
                return bincode::deserialize(&msg.bytes).expect("malformed payload from peer rank");
            }
            self.pending.entry((rank, tag)).or_default().push(msg);
        }
    }
}

impl<T> CollectiveCommunicator for LocalCommunicator<T> {
    fn broadcast_bytes(&mut self, root: i32, data: &mut Vec<u8>) {
        if self.rank == root {
            for peer in self.other_ranks() {
                self.senders[peer]
                    .send(Message {
                        tag: BROADCAST_TAG,
                        bytes: data.clone(),
                    })
                    .expect("peer rank's receiver dropped");
            }
        } else {
            let receiver = self.receivers.get(&root).expect("no channel to root rank");
            let msg = receiver.recv().expect("root rank's sender dropped");
            debug_assert_eq!(msg.tag, BROADCAST_TAG);
            *data = msg.bytes;
        }
    }

    fn barrier(&mut self) {
        // Every rank is a thread in the same process with no buffering
        // limit, so there is nothing to drain; a barrier is a no-op here.
    }
}

const BROADCAST_TAG: i32 = -1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_and_receive_matches_tag() {
        let mut comms = get_local_communicators::<i32>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();
        comm0.send_vec(1, 7, vec![1, 2, 3]);
        assert_eq!(comm1.receive_vec(0, 7), vec![1, 2, 3]);
    }

    #[test]
    fn out_of_order_tags_are_stashed_and_recovered() {
        let mut comms = get_local_communicators::<i32>(2);
        let mut comm1 = comms.pop().unwrap();
        let mut comm0 = comms.pop().unwrap();
        comm0.send_vec(1, 2, vec![20]);
        comm0.send_vec(1, 1, vec![10]);
        // Ask for tag 1 first even though it was sent second.
        assert_eq!(comm1.receive_vec(0, 1), vec![10]);
        assert_eq!(comm1.receive_vec(0, 2), vec![20]);
    }
}
