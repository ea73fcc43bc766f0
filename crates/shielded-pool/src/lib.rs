//! fixed-denomination shielded pool
//!
//! depositors put exactly one denomination behind a commitment
//! `H(nullifier, 0)`. anyone holding the nullifier can later withdraw to any
//! address by revealing `H(nullifier, 1, leaf_index)` together with a proof
//! that the commitment sits under a recent root. the proof hides which leaf.
//!
//! ## flow
//!
//! ```text
//! depositor                       pool                         observer
//!    | Deposit::generate()          |                              |
//!    | deposit(commitment) -------> | insert, emit {c, index} ---> | TreeMirror::sync
//!    |                              |                              |
//!    | prepare_withdrawal(mirror) <------------------------------- | path, root
//!    | prover.prove(..)             |                              |
//!    | withdraw(request) ---------> | spent? root? fee? proof?     |
//!    |                              | mark spent, pay out          |
//! ```
//!
//! the proving system is external; see [`proof`] for the port traits and
//! the development backend.

pub mod commitment;
pub mod config;
pub mod error;
pub mod events;
pub mod mirror;
pub mod note;
pub mod nullifier;
pub mod pool;
pub mod proof;
pub mod shared;
pub mod snapshot;
pub mod value;
pub mod withdrawal;

pub use commitment::{Commitment, NullifierHash, COMMITMENT_TAG, NULLIFIER_TAG};
pub use config::PoolConfig;
pub use error::{MirrorError, NoteError, PoolError, Result, RootRef};
pub use events::{DepositEvent, EventLog, PoolEvent, SequencedEvent, WithdrawalEvent};
pub use mirror::TreeMirror;
pub use note::{Deposit, Nullifier, NULLIFIER_LEN};
pub use nullifier::SpentSet;
pub use pool::{Payout, Pool, WithdrawRequest, WithdrawalReceipt};
pub use proof::{
    DevProofSystem, Proof, ProofError, ProofVerifier, Prover, PublicSignals, WithdrawWitness,
};
pub use shared::SharedPool;
pub use snapshot::PoolSnapshot;
pub use value::{Address, Amount};
pub use withdrawal::{prepare_withdrawal, RootSelection, WithdrawalInputs};

pub use merkle_tree::{Blake3Hasher, CommitmentHasher, Hash, MerklePath, Sha256Hasher};
