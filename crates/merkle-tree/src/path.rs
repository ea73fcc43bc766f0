//! merkle authentication paths
//!
//! the left/right convention lives here and nowhere else: every caller that
//! needs to fold a node with its sibling goes through [`Direction::combine`].

use crate::hasher::{CommitmentHasher, Hash};

/// which operand the current node is at one level of the path
///
/// `Left` folds as `H(current, sibling)` and encodes as bit 0,
/// `Right` folds as `H(sibling, current)` and encodes as bit 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// direction of the node at `level` on the path of leaf `index`
    pub fn of(index: u64, level: usize) -> Self {
        if (index >> level) & 1 == 0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    pub fn bit(self) -> u8 {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }

    /// parent of `current` and its `sibling`
    pub fn combine<H: CommitmentHasher>(self, hasher: &H, current: &Hash, sibling: &Hash) -> Hash {
        match self {
            Direction::Left => hasher.hash2(current, sibling),
            Direction::Right => hasher.hash2(sibling, current),
        }
    }
}

/// sibling hashes and directions from leaf to root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub siblings: Vec<Hash>,
    pub directions: Vec<Direction>,
}

impl MerklePath {
    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    /// leaf index encoded by the direction bits (bit i = level i)
    pub fn leaf_index(&self) -> u64 {
        self.directions
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == Direction::Right)
            .fold(0u64, |acc, (level, _)| {
                acc | 1u64.checked_shl(level as u32).unwrap_or(0)
            })
    }

    pub fn direction_bits(&self) -> Vec<u8> {
        self.directions.iter().map(|d| d.bit()).collect()
    }

    /// fold `leaf` up the path
    pub fn compute_root<H: CommitmentHasher>(&self, hasher: &H, leaf: &Hash) -> Hash {
        self.siblings
            .iter()
            .zip(&self.directions)
            .fold(*leaf, |current, (sibling, direction)| {
                direction.combine(hasher, &current, sibling)
            })
    }

    /// check that `leaf` is authenticated against `root`
    pub fn verify<H: CommitmentHasher>(&self, hasher: &H, leaf: &Hash, root: &Hash) -> bool {
        self.siblings.len() == self.directions.len() && &self.compute_root(hasher, leaf) == root
    }
}
