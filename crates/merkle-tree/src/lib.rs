//! incremental merkle tree with root history
//!
//! fixed-height, append-only commitment tree. each insert produces a new root;
//! the last `K` roots are retained so proofs built against a slightly stale
//! tree still validate, while anything older is forgotten.
//!
//! ```text
//!   level 2            root
//!                    /      \
//!   level 1      H(a,b)     Z1          Zl = empty subtree of height l
//!               /    \     /   \
//!   level 0    a      b   Z0    Z0
//! ```
//!
//! node composition is always `H(left, right)`. the convention is owned by
//! [`Direction::combine`]; paths, the tree and any mirror all fold through it.

pub mod error;
pub mod hasher;
pub mod history;
pub mod path;
pub mod reference;
pub mod tree;

pub use error::{Result, TreeError};
pub use hasher::{Blake3Hasher, CommitmentHasher, Hash, Sha256Hasher, ZERO_HASH};
pub use history::RootHistory;
pub use path::{Direction, MerklePath};
pub use reference::{compute_root_from_leaves, zero_hashes};
pub use tree::{IncrementalMerkleTree, MAX_HEIGHT};
