//! bounded root history
//!
//! ring of the last `capacity` roots. roots are addressed by a global
//! sequence number: root #0 is the empty tree, root #k is the root after the
//! k-th insertion. once a root falls out of the window it is gone for good.

use std::collections::VecDeque;

use crate::error::{Result, TreeError};
use crate::hasher::{Hash, ZERO_HASH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootHistory {
    roots: VecDeque<Hash>,
    capacity: usize,
    /// sequence number of the oldest retained root
    first: u64,
}

impl RootHistory {
    /// create a history seeded with the empty-tree root as root #0
    pub fn new(capacity: usize, initial_root: Hash) -> Result<Self> {
        if capacity == 0 {
            return Err(TreeError::InvalidHistorySize);
        }
        let mut roots = VecDeque::with_capacity(capacity);
        roots.push_back(initial_root);
        Ok(Self {
            roots,
            capacity,
            first: 0,
        })
    }

    /// append a root, evicting the oldest once full. returns its sequence number
    pub fn push(&mut self, root: Hash) -> u64 {
        if self.roots.len() == self.capacity {
            self.roots.pop_front();
            self.first += 1;
        }
        self.roots.push_back(root);
        self.latest_index()
    }

    pub fn latest(&self) -> Hash {
        self.roots.back().copied().unwrap_or(ZERO_HASH)
    }

    pub fn latest_index(&self) -> u64 {
        self.first + self.roots.len() as u64 - 1
    }

    pub fn oldest_index(&self) -> u64 {
        self.first
    }

    /// root #`index`, if still retained
    pub fn get(&self, index: u64) -> Result<Hash> {
        index
            .checked_sub(self.first)
            .and_then(|offset| self.roots.get(offset as usize))
            .copied()
            .ok_or(TreeError::UnknownRoot { index })
    }

    /// whether `root` is inside the window. the zero hash is never known
    pub fn contains(&self, root: &Hash) -> bool {
        if *root == ZERO_HASH {
            return false;
        }
        // newest first, most withdrawals reference a recent root
        self.roots.iter().rev().any(|r| r == root)
    }

    /// retained roots, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Hash> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
