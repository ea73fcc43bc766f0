//! the pool state machine
//!
//! one authoritative record: tree with root history, spent set, balance and
//! event log. every operation either fully applies or leaves the state
//! untouched.
//!
//! withdrawal checks run in a fixed order and the first failure wins:
//!
//! 1. nullifier hash already spent      -> `AlreadySpent`
//! 2. root outside the history window   -> `UnknownRoot`
//! 3. fee above the denomination        -> `FeeExceedsDenomination`
//! 4. verifier rejects                  -> `InvalidProof`
//! 5. balance below the denomination    -> `InsufficientBalance`

use std::collections::HashSet;

use merkle_tree::{CommitmentHasher, Hash, IncrementalMerkleTree};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::commitment::{Commitment, NullifierHash};
use crate::config::PoolConfig;
use crate::error::{PoolError, Result, RootRef};
use crate::events::{DepositEvent, EventLog, PoolEvent, WithdrawalEvent};
use crate::nullifier::SpentSet;
use crate::proof::{Proof, ProofVerifier, PublicSignals};
use crate::value::{Address, Amount};

/// a withdrawal as submitted to the pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub proof: Proof,
    pub root: Hash,
    pub nullifier_hash: NullifierHash,
    pub recipient: Address,
    pub relayer: Address,
    pub fee: Amount,
}

impl WithdrawRequest {
    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals {
            root: self.root,
            nullifier_hash: self.nullifier_hash,
            recipient: self.recipient,
            relayer: self.relayer,
            fee: self.fee,
        }
    }
}

/// one transfer for the host ledger to execute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub to: Address,
    pub amount: Amount,
}

/// outcome of an accepted withdrawal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub nullifier_hash: NullifierHash,
    /// recipient first, then the relayer if a fee was paid
    pub payouts: Vec<Payout>,
    /// sequence number of the emitted withdrawal event
    pub event_seq: u64,
}

impl WithdrawalReceipt {
    pub fn total(&self) -> Amount {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}

pub struct Pool<H: CommitmentHasher, V: ProofVerifier> {
    config: PoolConfig,
    tree: IncrementalMerkleTree<H>,
    spent: SpentSet,
    commitments: HashSet<Commitment>,
    balance: Amount,
    events: EventLog,
    verifier: V,
}

impl<H: CommitmentHasher, V: ProofVerifier> Pool<H, V> {
    pub fn new(hasher: H, verifier: V, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let tree = IncrementalMerkleTree::new(
            hasher,
            config.tree_height,
            config.root_history_size as usize,
        )?;

        info!(
            denomination = config.denomination,
            height = config.tree_height,
            history = config.root_history_size,
            "pool created"
        );

        Ok(Self {
            config,
            tree,
            spent: SpentSet::new(),
            commitments: HashSet::new(),
            balance: 0,
            events: EventLog::new(),
            verifier,
        })
    }

    /// insert `commitment`, returns its leaf index
    pub fn deposit(&mut self, commitment: Commitment, value: Amount) -> Result<u64> {
        let denomination = self.config.denomination;
        if value != denomination {
            return Err(PoolError::ValueMismatch {
                expected: denomination,
                got: value,
            });
        }
        if self.commitments.contains(&commitment) {
            return Err(PoolError::CommitmentAlreadyExists(commitment));
        }
        if self.tree.is_full() {
            return Err(PoolError::TreeFull {
                capacity: self.tree.capacity(),
            });
        }
        let balance = self
            .balance
            .checked_add(value)
            .ok_or(PoolError::BalanceOverflow)?;

        let leaf_index = self.tree.insert(commitment.0)?;
        self.commitments.insert(commitment);
        self.balance = balance;
        self.events.append(PoolEvent::Deposit(DepositEvent {
            commitment,
            leaf_index,
        }));

        info!(
            leaf_index,
            commitment = %commitment,
            root = %hex::encode(self.tree.root()),
            "deposit accepted"
        );
        Ok(leaf_index)
    }

    /// validate and settle a withdrawal
    pub fn withdraw(&mut self, request: &WithdrawRequest) -> Result<WithdrawalReceipt> {
        if let Err(e) = self.check_withdrawal(request) {
            warn!(
                nullifier_hash = %request.nullifier_hash,
                reason = %e,
                "withdrawal rejected"
            );
            return Err(e);
        }

        let receipt = self.settle(WithdrawalEvent {
            recipient: request.recipient,
            nullifier_hash: request.nullifier_hash,
            relayer: request.relayer,
            fee: request.fee,
        });

        info!(
            nullifier_hash = %request.nullifier_hash,
            recipient = %request.recipient,
            fee = request.fee,
            "withdrawal accepted"
        );
        Ok(receipt)
    }

    fn check_withdrawal(&self, request: &WithdrawRequest) -> Result<()> {
        if self.spent.contains(&request.nullifier_hash) {
            return Err(PoolError::AlreadySpent(request.nullifier_hash));
        }
        if !self.tree.contains_root(&request.root) {
            return Err(PoolError::UnknownRoot(RootRef::Hash(request.root)));
        }
        self.check_fee(request.fee)?;

        let signals = request.public_signals().to_field_elements();
        if !self.verifier.verify(&request.proof, &signals) {
            return Err(PoolError::InvalidProof);
        }
        self.check_balance()
    }

    fn check_fee(&self, fee: Amount) -> Result<()> {
        let denomination = self.config.denomination;
        if fee > denomination {
            return Err(PoolError::FeeExceedsDenomination { fee, denomination });
        }
        Ok(())
    }

    fn check_balance(&self) -> Result<()> {
        let required = self.config.denomination;
        if self.balance < required {
            return Err(PoolError::InsufficientBalance {
                balance: self.balance,
                required,
            });
        }
        Ok(())
    }

    /// apply an already validated withdrawal
    fn settle(&mut self, event: WithdrawalEvent) -> WithdrawalReceipt {
        let denomination = self.config.denomination;
        self.spent.insert(event.nullifier_hash);
        self.balance -= denomination;

        let mut payouts = vec![Payout {
            to: event.recipient,
            amount: denomination - event.fee,
        }];
        if event.fee > 0 {
            payouts.push(Payout {
                to: event.relayer,
                amount: event.fee,
            });
        }

        let event_seq = self.events.append(PoolEvent::Withdrawal(event));
        WithdrawalReceipt {
            nullifier_hash: event.nullifier_hash,
            payouts,
            event_seq,
        }
    }

    /// re-apply a logged withdrawal whose proof was already checked
    pub(crate) fn replay_withdrawal(&mut self, event: &WithdrawalEvent) -> Result<()> {
        if self.spent.contains(&event.nullifier_hash) {
            return Err(PoolError::AlreadySpent(event.nullifier_hash));
        }
        self.check_fee(event.fee)?;
        self.check_balance()?;
        self.settle(*event);
        Ok(())
    }

    // === queries ===

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn root_at(&self, k: u64) -> Result<Hash> {
        Ok(self.tree.root_at(k)?)
    }

    pub fn is_known_root(&self, root: &Hash) -> bool {
        self.tree.contains_root(root)
    }

    /// index the next deposit will get
    pub fn next_index(&self) -> u64 {
        self.tree.len()
    }

    pub fn is_spent(&self, nullifier_hash: &NullifierHash) -> bool {
        self.spent.contains(nullifier_hash)
    }

    pub fn is_spent_batch(&self, nullifier_hashes: &[NullifierHash]) -> Vec<bool> {
        nullifier_hashes.iter().map(|h| self.spent.contains(h)).collect()
    }

    pub fn contains_commitment(&self, commitment: &Commitment) -> bool {
        self.commitments.contains(commitment)
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn denomination(&self) -> Amount {
        self.config.denomination
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn spent_count(&self) -> usize {
        self.spent.len()
    }

    pub fn tree(&self) -> &IncrementalMerkleTree<H> {
        &self.tree
    }

    pub fn hasher(&self) -> &H {
        self.tree.hasher()
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}
