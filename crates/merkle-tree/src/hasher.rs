//! commitment hashing
//!
//! the tree, commitments and nullifier hashes all go through one
//! [`CommitmentHasher`]. its internals are opaque to the rest of the
//! workspace; the only thing that matters is that the encoding matches
//! whatever the external proof predicate recomputes.

use sha2::{Digest, Sha256};

/// 32-byte hash
pub type Hash = [u8; 32];

/// all-zero hash, never a valid root
pub const ZERO_HASH: Hash = [0u8; 32];

/// two-ary / three-ary collision-resistant hash
pub trait CommitmentHasher: Clone + Send + Sync {
    /// H2(left, right), used for tree nodes and commitments
    fn hash2(&self, left: &Hash, right: &Hash) -> Hash;

    /// H3(input, tag, index), used for nullifier hashes
    fn hash3(&self, input: &Hash, tag: u8, index: u64) -> Hash;

    /// value of an unoccupied leaf
    fn zero_leaf(&self) -> Hash;
}

const BLAKE3_NODE_DOMAIN: &[u8] = b"merkle-tree.blake3.h2.v1";
const BLAKE3_TAGGED_DOMAIN: &[u8] = b"merkle-tree.blake3.h3.v1";
const BLAKE3_ZERO_DOMAIN: &[u8] = b"merkle-tree.blake3.zero-leaf.v1";

/// blake3 with per-arity domain separation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl CommitmentHasher for Blake3Hasher {
    fn hash2(&self, left: &Hash, right: &Hash) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BLAKE3_NODE_DOMAIN);
        hasher.update(left);
        hasher.update(right);
        *hasher.finalize().as_bytes()
    }

    fn hash3(&self, input: &Hash, tag: u8, index: u64) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BLAKE3_TAGGED_DOMAIN);
        hasher.update(input);
        hasher.update(&[tag]);
        hasher.update(&index.to_be_bytes());
        *hasher.finalize().as_bytes()
    }

    fn zero_leaf(&self) -> Hash {
        *blake3::hash(BLAKE3_ZERO_DOMAIN).as_bytes()
    }
}

const SHA256_NODE_DOMAIN: &[u8] = b"merkle-tree.sha256.h2.v1";
const SHA256_TAGGED_DOMAIN: &[u8] = b"merkle-tree.sha256.h3.v1";
const SHA256_ZERO_DOMAIN: &[u8] = b"merkle-tree.sha256.zero-leaf.v1";

/// sha256 with per-arity domain separation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl CommitmentHasher for Sha256Hasher {
    fn hash2(&self, left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(SHA256_NODE_DOMAIN);
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }

    fn hash3(&self, input: &Hash, tag: u8, index: u64) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(SHA256_TAGGED_DOMAIN);
        hasher.update(input);
        hasher.update([tag]);
        hasher.update(index.to_be_bytes());
        hasher.finalize().into()
    }

    fn zero_leaf(&self) -> Hash {
        Sha256::digest(SHA256_ZERO_DOMAIN).into()
    }
}
