//! error types for the commitment tree

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree is full: all {capacity} leaves are occupied")]
    TreeFull { capacity: u64 },

    #[error("leaf index {index} out of range (tree holds {count} leaves)")]
    IndexOutOfRange { index: u64, count: u64 },

    #[error("root #{index} is not in the retained history window")]
    UnknownRoot { index: u64 },

    #[error("invalid tree height {0} (must be within 1..=32)")]
    InvalidHeight(u8),

    #[error("root history must retain at least one root")]
    InvalidHistorySize,
}
