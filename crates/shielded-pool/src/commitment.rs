//! commitments and nullifier hashes
//!
//! commitment     = H2(nullifier, 0)
//! nullifier hash = H3(nullifier, 1, leaf_index)
//!
//! the two tags keep a commitment from ever being mistaken for a nullifier
//! hash of the same secret.

use std::fmt;

use merkle_tree::{CommitmentHasher, Hash};
use serde::{Deserialize, Serialize};

use crate::note::Nullifier;

/// domain tag for commitments
pub const COMMITMENT_TAG: u8 = 0;
/// domain tag for nullifier hashes
pub const NULLIFIER_TAG: u8 = 1;

/// public commitment to a deposit, the leaf that goes in the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub Hash);

impl Commitment {
    pub fn derive<H: CommitmentHasher>(hasher: &H, nullifier: &Nullifier) -> Self {
        Self(hasher.hash2(&nullifier.to_field(), &tag_field(COMMITMENT_TAG)))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// revealed once at withdrawal, then recorded as spent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NullifierHash(pub Hash);

impl NullifierHash {
    pub fn derive<H: CommitmentHasher>(hasher: &H, nullifier: &Nullifier, leaf_index: u64) -> Self {
        Self(hasher.hash3(&nullifier.to_field(), NULLIFIER_TAG, leaf_index))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for NullifierHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NullifierHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// a tag as a 32-byte big-endian element
fn tag_field(tag: u8) -> Hash {
    let mut out = [0u8; 32];
    out[31] = tag;
    out
}
