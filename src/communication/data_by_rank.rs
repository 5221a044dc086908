//! A sparse map from peer rank to per-peer data, initialized once per
//! communicator (grounded on the teacher's `DataByRank`).

use std::collections::hash_map;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use super::sized_communicator::{Rank, SizedCommunicator};

#[derive(Debug, Clone)]
pub struct DataByRank<T>(HashMap<Rank, T>);

impl<T> DataByRank<T> {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, rank: &Rank) -> Option<&T> {
        self.0.get(rank)
    }

    pub fn get_mut(&mut self, rank: &Rank) -> Option<&mut T> {
        self.0.get_mut(rank)
    }

    pub fn insert(&mut self, rank: Rank, data: T) {
        self.0.insert(rank, data);
    }

    pub fn remove(&mut self, rank: &Rank) -> Option<T> {
        self.0.remove(rank)
    }
}

impl<T> DataByRank<T>
where
    T: Default,
{
    pub fn from_communicator(communicator: &impl SizedCommunicator) -> Self {
        Self(
            communicator
                .other_ranks()
                .into_iter()
                .map(|rank| (rank, T::default()))
                .collect(),
        )
    }
}

impl<T> Index<Rank> for DataByRank<T> {
    type Output = T;

    fn index(&self, index: Rank) -> &Self::Output {
        self.get(&index).unwrap()
    }
}

impl<T> IndexMut<Rank> for DataByRank<T> {
    fn index_mut(&mut self, index: Rank) -> &mut Self::Output {
        self.get_mut(&index).unwrap()
    }
}

impl<T> IntoIterator for DataByRank<T> {
    type Item = (Rank, T);
    type IntoIter = hash_map::IntoIter<Rank, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_index() {
        let mut d: DataByRank<i32> = DataByRank::empty();
        d.insert(1, 42);
        assert_eq!(d[1], 42);
        assert_eq!(d.remove(&1), Some(42));
    }
}
