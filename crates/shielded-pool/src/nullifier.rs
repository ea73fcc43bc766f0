//! spent nullifier hashes

use std::collections::HashSet;

use crate::commitment::NullifierHash;

/// grows monotonically; nothing is ever removed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpentSet {
    spent: HashSet<NullifierHash>,
}

impl SpentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, nullifier_hash: &NullifierHash) -> bool {
        self.spent.contains(nullifier_hash)
    }

    /// mark spent, returns false if it already was (double-spend attempt)
    pub fn insert(&mut self, nullifier_hash: NullifierHash) -> bool {
        self.spent.insert(nullifier_hash)
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}
