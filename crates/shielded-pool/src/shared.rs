//! thread-safe pool handle
//!
//! every mutation goes through the write lock, so deposits and withdrawals
//! share one global order. the spent check and the spent insert of a
//! withdrawal happen under the same write guard.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use merkle_tree::{CommitmentHasher, Hash};

use crate::commitment::{Commitment, NullifierHash};
use crate::error::Result;
use crate::events::{EventLog, SequencedEvent};
use crate::pool::{Pool, WithdrawRequest, WithdrawalReceipt};
use crate::proof::ProofVerifier;
use crate::value::Amount;

pub struct SharedPool<H: CommitmentHasher, V: ProofVerifier>(Arc<RwLock<Pool<H, V>>>);

impl<H: CommitmentHasher, V: ProofVerifier> SharedPool<H, V> {
    pub fn new(pool: Pool<H, V>) -> Self {
        Self(Arc::new(RwLock::new(pool)))
    }

    // pool methods validate before mutating, poison carries no torn state
    fn read(&self) -> RwLockReadGuard<'_, Pool<H, V>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Pool<H, V>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn deposit(&self, commitment: Commitment, value: Amount) -> Result<u64> {
        self.write().deposit(commitment, value)
    }

    pub fn withdraw(&self, request: &WithdrawRequest) -> Result<WithdrawalReceipt> {
        self.write().withdraw(request)
    }

    pub fn root(&self) -> Hash {
        self.read().root()
    }

    pub fn root_at(&self, k: u64) -> Result<Hash> {
        self.read().root_at(k)
    }

    pub fn is_known_root(&self, root: &Hash) -> bool {
        self.read().is_known_root(root)
    }

    pub fn next_index(&self) -> u64 {
        self.read().next_index()
    }

    pub fn is_spent(&self, nullifier_hash: &NullifierHash) -> bool {
        self.read().is_spent(nullifier_hash)
    }

    pub fn is_spent_batch(&self, nullifier_hashes: &[NullifierHash]) -> Vec<bool> {
        self.read().is_spent_batch(nullifier_hashes)
    }

    pub fn balance(&self) -> Amount {
        self.read().balance()
    }

    pub fn denomination(&self) -> Amount {
        self.read().denomination()
    }

    /// copies of events from `seq` on
    pub fn events_since(&self, seq: u64) -> Vec<SequencedEvent> {
        self.read().events().since(seq)
    }

    /// copy of the whole log
    pub fn events(&self) -> EventLog {
        self.read().events().clone()
    }

    /// run `f` with shared access
    pub fn with<R>(&self, f: impl FnOnce(&Pool<H, V>) -> R) -> R {
        f(&self.read())
    }
}

impl<H: CommitmentHasher, V: ProofVerifier> Clone for SharedPool<H, V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
