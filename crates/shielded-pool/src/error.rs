//! error types for the shielded pool

use std::fmt;

use merkle_tree::{Hash, TreeError};
use thiserror::Error;

use crate::commitment::{Commitment, NullifierHash};
use crate::proof::ProofError;
use crate::value::Amount;

pub type Result<T> = std::result::Result<T, PoolError>;

/// how a root was referenced when it could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootRef {
    /// by value, as submitted with a withdrawal
    Hash(Hash),
    /// by sequence number, as in `root_at(k)`
    Index(u64),
}

impl fmt::Display for RootRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootRef::Hash(root) => write!(f, "0x{}", hex::encode(root)),
            RootRef::Index(index) => write!(f, "#{index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    // === withdrawal rejections ===
    #[error("nullifier hash {0} already spent")]
    AlreadySpent(NullifierHash),

    #[error("unknown merkle root {0}")]
    UnknownRoot(RootRef),

    #[error("fee {fee} exceeds denomination {denomination}")]
    FeeExceedsDenomination { fee: Amount, denomination: Amount },

    #[error("invalid withdrawal proof")]
    InvalidProof,

    #[error("pool balance {balance} cannot cover {required}")]
    InsufficientBalance { balance: Amount, required: Amount },

    // === deposit rejections ===
    #[error("deposit value {got} does not match denomination {expected}")]
    ValueMismatch { expected: Amount, got: Amount },

    #[error("tree is full ({capacity} leaves)")]
    TreeFull { capacity: u64 },

    #[error("commitment {0} already deposited")]
    CommitmentAlreadyExists(Commitment),

    #[error("pool balance overflow")]
    BalanceOverflow,

    // === queries ===
    #[error("leaf index {index} out of range (tree holds {count} leaves)")]
    IndexOutOfRange { index: u64, count: u64 },

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error("proof error: {0}")]
    Proof(#[from] ProofError),

    // === configuration / persistence ===
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<TreeError> for PoolError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::TreeFull { capacity } => PoolError::TreeFull { capacity },
            TreeError::IndexOutOfRange { index, count } => {
                PoolError::IndexOutOfRange { index, count }
            }
            TreeError::UnknownRoot { index } => PoolError::UnknownRoot(RootRef::Index(index)),
            TreeError::InvalidHeight(_) | TreeError::InvalidHistorySize => {
                PoolError::InvalidConfig(e.to_string())
            }
        }
    }
}

/// failures handling a deposit record or its note string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("deposit has no leaf index yet")]
    LeafIndexUnassigned,

    #[error("deposit already holds leaf index {0}")]
    LeafIndexAlreadyAssigned(u64),

    #[error("malformed note: {0}")]
    MalformedNote(String),

    #[error("commitment {0} not found in event log")]
    CommitmentNotFound(Commitment),
}

/// failures replaying the event log into a mirror
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    #[error("event out of order: expected {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

impl From<serde_json::Error> for PoolError {
    fn from(e: serde_json::Error) -> Self {
        PoolError::Serialization(e.to_string())
    }
}
