//! Point-to-point blocking send/receive, keyed by peer rank and tag
//! (spec.md §4.6/§4.7 use this directly for the count-negotiate-then-payload
//! halo exchange and migration protocols).

use super::sized_communicator::{Rank, SizedCommunicator};

pub trait Communicator<T>: SizedCommunicator {
    fn send_vec(&mut self, rank: Rank, tag: i32, data: Vec<T>);
    fn receive_vec(&mut self, rank: Rank, tag: i32) -> Vec<T>;
}
