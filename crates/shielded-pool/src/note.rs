//! depositor-side secrets
//!
//! a [`Deposit`] is the only thing a depositor has to keep: the random
//! nullifier, plus the leaf index once the pool has assigned one. the leaf
//! index is public and can always be recovered from the event log, so the
//! exported note string carries only the nullifier.

use std::fmt;

use merkle_tree::{CommitmentHasher, Hash};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::commitment::{Commitment, NullifierHash};
use crate::error::{NoteError, PoolError, Result};
use crate::mirror::TreeMirror;
use crate::value::Amount;

/// secret length in bytes (248 bits, fits below any 254-bit field modulus)
pub const NULLIFIER_LEN: usize = 31;

const NOTE_PREFIX: &str = "shielded-pool";

/// random secret behind a commitment
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Nullifier([u8; NULLIFIER_LEN]);

impl Nullifier {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; NULLIFIER_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// draw from the os csprng
    pub fn generate() -> Self {
        Self::random(&mut OsRng)
    }

    pub fn from_bytes(bytes: [u8; NULLIFIER_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NULLIFIER_LEN] {
        &self.0
    }

    /// big-endian field element, one leading zero byte
    pub fn to_field(&self) -> Hash {
        let mut out = [0u8; 32];
        out[32 - NULLIFIER_LEN..].copy_from_slice(&self.0);
        out
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nullifier(<redacted>)")
    }
}

/// a deposit as held by its owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    nullifier: Nullifier,
    leaf_index: Option<u64>,
}

impl Deposit {
    /// fresh deposit from the os csprng
    pub fn generate() -> Self {
        Self::from_nullifier(Nullifier::generate())
    }

    pub fn from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_nullifier(Nullifier::random(rng))
    }

    pub fn from_nullifier(nullifier: Nullifier) -> Self {
        Self {
            nullifier,
            leaf_index: None,
        }
    }

    pub fn nullifier(&self) -> &Nullifier {
        &self.nullifier
    }

    pub fn leaf_index(&self) -> Option<u64> {
        self.leaf_index
    }

    pub fn commitment<H: CommitmentHasher>(&self, hasher: &H) -> Commitment {
        Commitment::derive(hasher, &self.nullifier)
    }

    /// record the index the pool assigned. set once, never changed.
    pub fn assign_leaf_index(&mut self, index: u64) -> Result<()> {
        match self.leaf_index {
            Some(existing) if existing == index => Ok(()),
            Some(existing) => Err(NoteError::LeafIndexAlreadyAssigned(existing).into()),
            None => {
                self.leaf_index = Some(index);
                Ok(())
            }
        }
    }

    pub fn nullifier_hash<H: CommitmentHasher>(&self, hasher: &H) -> Result<NullifierHash> {
        let index = self.leaf_index.ok_or(NoteError::LeafIndexUnassigned)?;
        Ok(NullifierHash::derive(hasher, &self.nullifier, index))
    }

    /// look the commitment up in a mirror and assign its leaf index
    pub fn locate<H: CommitmentHasher>(&mut self, mirror: &TreeMirror<H>) -> Result<u64> {
        let commitment = self.commitment(mirror.hasher());
        let index = mirror
            .find(&commitment)
            .ok_or(NoteError::CommitmentNotFound(commitment))?;
        self.assign_leaf_index(index)?;
        Ok(index)
    }

    /// `shielded-pool-<denomination>-0x<nullifier hex>`
    pub fn to_note_string(&self, denomination: Amount) -> String {
        format!(
            "{}-{}-0x{}",
            NOTE_PREFIX,
            denomination,
            hex::encode(self.nullifier.as_bytes())
        )
    }

    /// parse a note string back into its denomination and an unindexed deposit
    pub fn from_note_string(note: &str) -> Result<(Amount, Deposit)> {
        let rest = note
            .strip_prefix(NOTE_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(|| malformed("missing prefix"))?;

        let (denomination, secret) = rest
            .split_once('-')
            .ok_or_else(|| malformed("missing separator"))?;

        let denomination: Amount = denomination
            .parse()
            .map_err(|_| malformed("bad denomination"))?;

        let secret = secret
            .strip_prefix("0x")
            .ok_or_else(|| malformed("secret must be 0x-prefixed"))?;
        let mut bytes = hex::decode(secret).map_err(|e| malformed(&e.to_string()))?;
        if bytes.len() != NULLIFIER_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(malformed(&format!(
                "secret is {len} bytes, expected {NULLIFIER_LEN}"
            )));
        }

        let mut raw = [0u8; NULLIFIER_LEN];
        raw.copy_from_slice(&bytes);
        bytes.zeroize();
        let nullifier = Nullifier::from_bytes(raw);
        raw.zeroize();

        Ok((denomination, Deposit::from_nullifier(nullifier)))
    }
}

fn malformed(reason: &str) -> PoolError {
    NoteError::MalformedNote(reason.to_string()).into()
}
