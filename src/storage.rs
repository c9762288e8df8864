//! State storage: assigns dense indices to distinct state values.
//!
//! States are stored in a contiguous vector in discovery order. Lookup goes
//! through a bucket array of chained entries (each entry links to the next
//! entry of the same bucket). The number of stored states is bounded by a
//! fixed capacity; exceeding it is reported as
//! [`Error::StateSpaceOverflow`][crate::error::Error::StateSpaceOverflow].

use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::ops::Index;

use crate::error::{Error, Result};

/// Marks the end of a bucket chain.
const NIL: usize = usize::MAX;

/// Maximal load (entries per bucket) before the bucket array is doubled.
const MAX_LOAD: usize = 2;

#[derive(Debug, Clone)]
struct Entry<S> {
    state: S,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct StateStorage<S> {
    data: Vec<Entry<S>>,
    buckets: Vec<usize>,
    bitmask: u64,
    capacity: usize,
    hasher: BuildHasherDefault<DefaultHasher>,
}

impl<S> StateStorage<S> {
    /// Create a new storage holding at most `capacity` states.
    pub fn new(capacity: usize) -> Self {
        let buckets_bits = 4;
        let buckets_size = 1 << buckets_bits;
        Self {
            data: Vec::new(),
            buckets: vec![NIL; buckets_size],
            bitmask: (buckets_size - 1) as u64,
            capacity,
            hasher: BuildHasherDefault::default(),
        }
    }

    /// Get the number of stored states.
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the state stored at the given index.
    pub fn state(&self, index: usize) -> &S {
        &self.data[index].state
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.data.iter().map(|e| &e.state)
    }
}

impl<S> StateStorage<S>
where
    S: Eq + Hash,
{
    fn bucket_index(&self, state: &S) -> usize {
        (self.hasher.hash_one(state) & self.bitmask) as usize
    }

    /// Find the index of a state, if it is stored.
    pub fn index_of(&self, state: &S) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(state)];
        while index != NIL {
            let entry = &self.data[index];
            if &entry.state == state {
                return Some(index);
            }
            index = entry.next;
        }
        None
    }

    /// Put a state into the storage.
    ///
    /// Returns its index and whether it was newly added.
    pub fn put(&mut self, state: S) -> Result<(usize, bool)>
    where
        S: Debug,
    {
        if let Some(index) = self.index_of(&state) {
            return Ok((index, false));
        }

        if self.data.len() >= self.capacity {
            return Err(Error::StateSpaceOverflow {
                limit: self.capacity,
                state: format!("{:?}", state),
            });
        }

        if self.data.len() >= self.buckets.len() * MAX_LOAD {
            self.grow();
        }

        let index = self.data.len();
        let bucket = self.bucket_index(&state);
        self.data.push(Entry {
            state,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = index;
        Ok((index, true))
    }

    /// Double the bucket array and relink all entries.
    fn grow(&mut self) {
        let buckets_size = self.buckets.len() * 2;
        self.buckets = vec![NIL; buckets_size];
        self.bitmask = (buckets_size - 1) as u64;
        for index in 0..self.data.len() {
            let bucket = self.bucket_index(&self.data[index].state);
            self.data[index].next = self.buckets[bucket];
            self.buckets[bucket] = index;
        }
    }
}

impl<S> Index<usize> for StateStorage<S> {
    type Output = S;

    fn index(&self, index: usize) -> &Self::Output {
        self.state(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put() {
        let mut storage = StateStorage::new(4);
        assert_eq!(storage.put("a").unwrap(), (0, true));
        assert_eq!(storage.put("b").unwrap(), (1, true));
        assert_eq!(storage.put("a").unwrap(), (0, false));
        assert_eq!(storage.len(), 2);
        assert_eq!(storage[1], "b");
        assert_eq!(storage.index_of(&"b"), Some(1));
        assert_eq!(storage.index_of(&"c"), None);
    }

    #[test]
    fn test_put_too_much() {
        let mut storage = StateStorage::new(2);
        storage.put(1).unwrap();
        storage.put(2).unwrap();
        // Known states are still found when full.
        assert_eq!(storage.put(1).unwrap(), (0, false));
        let err = storage.put(3).unwrap_err();
        assert_eq!(
            err,
            Error::StateSpaceOverflow {
                limit: 2,
                state: "3".to_string()
            }
        );
    }

    #[test]
    fn test_grow_keeps_indices() {
        let mut storage = StateStorage::new(10_000);
        for i in 0..1000u32 {
            assert_eq!(storage.put(i * 7).unwrap(), (i as usize, true));
        }
        for i in 0..1000u32 {
            assert_eq!(storage.index_of(&(i * 7)), Some(i as usize));
        }
        assert_eq!(storage.len(), 1000);
    }
}
