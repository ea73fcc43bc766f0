//! building withdrawal inputs from a deposit and a mirror

use merkle_tree::{CommitmentHasher, Hash, IncrementalMerkleTree, MerklePath};

use crate::error::{NoteError, PoolError, Result, RootRef};
use crate::mirror::TreeMirror;
use crate::note::Deposit;
use crate::pool::WithdrawRequest;
use crate::proof::{Prover, PublicSignals, WithdrawWitness};
use crate::value::{Address, Amount};

/// which root to prove membership against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootSelection {
    /// the mirror's current root
    #[default]
    Latest,
    /// root after `k` insertions, must still be in the mirror's history
    At(u64),
}

/// everything a prover needs for one withdrawal
#[derive(Clone, Debug)]
pub struct WithdrawalInputs {
    pub public: PublicSignals,
    pub witness: WithdrawWitness,
}

impl WithdrawalInputs {
    /// run the prover and package the result for [`Pool::withdraw`](crate::Pool::withdraw)
    pub fn prove<P: Prover + ?Sized>(&self, prover: &P) -> Result<WithdrawRequest> {
        let proof = prover.prove(&self.witness, &self.public)?;
        Ok(WithdrawRequest {
            proof,
            root: self.public.root,
            nullifier_hash: self.public.nullifier_hash,
            recipient: self.public.recipient,
            relayer: self.public.relayer,
            fee: self.public.fee,
        })
    }
}

/// assemble public signals and witness for `deposit`
///
/// the leaf index is taken from the deposit if assigned, otherwise looked up
/// in the mirror. the deposit itself is not modified.
pub fn prepare_withdrawal<H: CommitmentHasher>(
    deposit: &Deposit,
    mirror: &TreeMirror<H>,
    root: RootSelection,
    recipient: Address,
    relayer: Address,
    fee: Amount,
) -> Result<WithdrawalInputs> {
    let hasher = mirror.hasher();
    let commitment = deposit.commitment(hasher);

    let index = match deposit.leaf_index() {
        Some(index) => index,
        None => mirror
            .find(&commitment)
            .ok_or(NoteError::CommitmentNotFound(commitment))?,
    };
    if mirror.tree().leaf(index) != Some(commitment.0) {
        return Err(NoteError::CommitmentNotFound(commitment).into());
    }

    let (root, path) = match root {
        RootSelection::Latest => (mirror.root(), mirror.path(index)?),
        RootSelection::At(k) => historical_path(mirror, k, index)?,
    };

    let mut indexed = deposit.clone();
    indexed.assign_leaf_index(index)?;

    Ok(WithdrawalInputs {
        public: PublicSignals {
            root,
            nullifier_hash: indexed.nullifier_hash(hasher)?,
            recipient,
            relayer,
            fee,
        },
        witness: WithdrawWitness {
            nullifier: deposit.nullifier().clone(),
            path,
        },
    })
}

/// path for `index` in the tree as it stood after `k` leaves
fn historical_path<H: CommitmentHasher>(
    mirror: &TreeMirror<H>,
    k: u64,
    index: u64,
) -> Result<(Hash, MerklePath)> {
    let root = mirror.root_at(k)?;
    if index >= k {
        return Err(PoolError::IndexOutOfRange { index, count: k });
    }
    if k == mirror.len() {
        return Ok((root, mirror.path(index)?));
    }

    let tree = mirror.tree();
    let mut prefix = IncrementalMerkleTree::new(tree.hasher().clone(), tree.height(), 1)?;
    for leaf in &tree.leaves()[..k as usize] {
        prefix.insert(*leaf)?;
    }
    if prefix.root() != root {
        return Err(PoolError::UnknownRoot(RootRef::Hash(root)));
    }
    Ok((root, prefix.path(index)?))
}
