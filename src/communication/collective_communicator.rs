//! Collective operations used by the driver: rank-0 broadcast of the CLI
//! configuration at startup, and a barrier before each timed phase
//! (spec.md §4.8).

pub trait CollectiveCommunicator {
    fn broadcast_bytes(&mut self, root: i32, data: &mut Vec<u8>);
    fn barrier(&mut self);
}
