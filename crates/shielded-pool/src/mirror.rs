//! local replica of the pool tree
//!
//! a mirror is rebuilt purely from the event log. events must arrive in
//! emission order; anything else is rejected without touching the replica.

use std::collections::HashMap;

use merkle_tree::{CommitmentHasher, Hash, IncrementalMerkleTree, MerklePath};
use tracing::debug;

use crate::commitment::Commitment;
use crate::config::PoolConfig;
use crate::error::{MirrorError, Result};
use crate::events::{DepositEvent, EventLog, PoolEvent, SequencedEvent};

#[derive(Clone, Debug)]
pub struct TreeMirror<H: CommitmentHasher> {
    tree: IncrementalMerkleTree<H>,
    positions: HashMap<Commitment, u64>,
    /// next event sequence number expected
    cursor: u64,
}

impl<H: CommitmentHasher> TreeMirror<H> {
    pub fn new(hasher: H, height: u8, root_history_size: usize) -> Result<Self> {
        let tree = IncrementalMerkleTree::new(hasher, height, root_history_size)
            .map_err(MirrorError::Tree)?;
        Ok(Self {
            tree,
            positions: HashMap::new(),
            cursor: 0,
        })
    }

    pub fn from_config(hasher: H, config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Self::new(hasher, config.tree_height, config.root_history_size as usize)
    }

    /// build a mirror from a full event sequence
    pub fn replay<'a, I>(hasher: H, config: &PoolConfig, events: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a SequencedEvent>,
    {
        let mut mirror = Self::from_config(hasher, config)?;
        for event in events {
            mirror.apply_event(event)?;
        }
        Ok(mirror)
    }

    /// insert a deposit; its leaf index must be the next one
    pub fn apply(&mut self, deposit: &DepositEvent) -> Result<u64> {
        let expected = self.tree.len();
        if deposit.leaf_index != expected {
            return Err(MirrorError::OutOfOrder {
                expected,
                got: deposit.leaf_index,
            }
            .into());
        }

        let index = self
            .tree
            .insert(deposit.commitment.0)
            .map_err(MirrorError::Tree)?;
        self.positions.entry(deposit.commitment).or_insert(index);
        Ok(index)
    }

    /// apply one sequenced event; withdrawals only advance the cursor
    pub fn apply_event(&mut self, event: &SequencedEvent) -> Result<()> {
        if event.seq != self.cursor {
            return Err(MirrorError::OutOfOrder {
                expected: self.cursor,
                got: event.seq,
            }
            .into());
        }
        if let PoolEvent::Deposit(deposit) = &event.event {
            self.apply(deposit)?;
        }
        self.cursor += 1;
        Ok(())
    }

    /// pull everything past the cursor, returns how many events were applied
    pub fn sync(&mut self, log: &EventLog) -> Result<usize> {
        let pending = log.since(self.cursor);
        for event in &pending {
            self.apply_event(event)?;
        }
        if !pending.is_empty() {
            debug!(
                applied = pending.len(),
                leaves = self.tree.len(),
                root = %hex::encode(&self.tree.root()[..8]),
                "mirror synced"
            );
        }
        Ok(pending.len())
    }

    /// leaf index of a commitment, if it has been seen
    pub fn find(&self, commitment: &Commitment) -> Option<u64> {
        self.positions.get(commitment).copied()
    }

    pub fn path(&self, index: u64) -> Result<MerklePath> {
        Ok(self.tree.path(index)?)
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn root_at(&self, k: u64) -> Result<Hash> {
        Ok(self.tree.root_at(k)?)
    }

    pub fn contains_root(&self, root: &Hash) -> bool {
        self.tree.contains_root(root)
    }

    pub fn len(&self) -> u64 {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn hasher(&self) -> &H {
        self.tree.hasher()
    }

    pub fn tree(&self) -> &IncrementalMerkleTree<H> {
        &self.tree
    }
}
