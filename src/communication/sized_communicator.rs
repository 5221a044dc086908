//! Rank/size bookkeeping shared by every communicator backend.

pub type Rank = i32;

pub trait SizedCommunicator {
    fn rank(&self) -> Rank;
    fn size(&self) -> usize;

    fn is_main(&self) -> bool {
        self.rank() == 0
    }

    fn other_ranks(&self) -> Vec<Rank> {
        (0..self.size() as Rank).filter(|r| *r != self.rank()).collect()
    }
}
