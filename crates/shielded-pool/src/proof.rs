//! withdrawal proofs
//!
//! the proving system is a black box behind two traits. [`Prover`] turns a
//! private witness plus public signals into a [`Proof`]; [`ProofVerifier`]
//! accepts or rejects a proof against the ordered public signals. the pool
//! only ever sees the verifier.
//!
//! the relation being proven:
//! - `H2(nullifier, 0)` is a leaf authenticated against `root` by the path
//! - `nullifier_hash = H3(nullifier, 1, leaf_index)` where `leaf_index` is
//!   the integer encoded by the path's direction bits
//! - recipient, relayer and fee are bound to the proof
//!
//! [`DevProofSystem`] is a development backend: it checks the relation in the
//! clear and emits a keyed-hash transcript over the public signals. it is not
//! zero knowledge and must not guard real funds.

use std::sync::Arc;

use merkle_tree::{CommitmentHasher, Hash, MerklePath};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use thiserror::Error;

use crate::commitment::{Commitment, NullifierHash};
use crate::note::Nullifier;
use crate::value::{amount_to_field, Address, Amount};

/// serialized proof length: a (64) + b (128) + c (64)
pub const PROOF_LEN: usize = 256;

/// number of public signals
pub const PUBLIC_SIGNALS_LEN: usize = 5;

const DEV_TRANSCRIPT_DOMAIN: &[u8] = b"shielded-pool.dev-proof.v1";

/// errors during proof construction or decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("witness does not satisfy the relation: {0}")]
    WitnessMismatch(String),

    #[error("path height {got} does not match tree height {expected}")]
    HeightMismatch { expected: usize, got: usize },

    #[error("proof is {0} bytes, expected {PROOF_LEN}")]
    InvalidLength(usize),
}

/// opaque G1/G2/G1 proof triple
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "BigArray")]
    pub a: [u8; 64],
    #[serde(with = "BigArray")]
    pub b: [u8; 128],
    #[serde(with = "BigArray")]
    pub c: [u8; 64],
}

impl Proof {
    pub fn to_bytes(&self) -> [u8; PROOF_LEN] {
        let mut out = [0u8; PROOF_LEN];
        out[..64].copy_from_slice(&self.a);
        out[64..192].copy_from_slice(&self.b);
        out[192..].copy_from_slice(&self.c);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        if bytes.len() != PROOF_LEN {
            return Err(ProofError::InvalidLength(bytes.len()));
        }
        let mut proof = Proof {
            a: [0u8; 64],
            b: [0u8; 128],
            c: [0u8; 64],
        };
        proof.a.copy_from_slice(&bytes[..64]);
        proof.b.copy_from_slice(&bytes[64..192]);
        proof.c.copy_from_slice(&bytes[192..]);
        Ok(proof)
    }
}

/// public inputs to a withdrawal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    pub root: Hash,
    pub nullifier_hash: NullifierHash,
    pub recipient: Address,
    pub relayer: Address,
    pub fee: Amount,
}

impl PublicSignals {
    /// `[root, nullifier_hash, recipient, relayer, fee]`
    pub fn to_field_elements(&self) -> [Hash; PUBLIC_SIGNALS_LEN] {
        [
            self.root,
            self.nullifier_hash.0,
            self.recipient.to_field(),
            self.relayer.to_field(),
            amount_to_field(self.fee),
        ]
    }
}

/// private inputs to a withdrawal
#[derive(Clone, Debug)]
pub struct WithdrawWitness {
    pub nullifier: Nullifier,
    pub path: MerklePath,
}

impl WithdrawWitness {
    pub fn siblings(&self) -> &[Hash] {
        &self.path.siblings
    }

    pub fn direction_bits(&self) -> Vec<u8> {
        self.path.direction_bits()
    }
}

/// external proof verification capability
pub trait ProofVerifier: Send + Sync {
    /// `public_signals` in [`PublicSignals::to_field_elements`] order
    fn verify(&self, proof: &Proof, public_signals: &[Hash]) -> bool;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Arc<V> {
    fn verify(&self, proof: &Proof, public_signals: &[Hash]) -> bool {
        (**self).verify(proof, public_signals)
    }
}

/// external proof generation capability
pub trait Prover: Send + Sync {
    fn prove(&self, witness: &WithdrawWitness, public: &PublicSignals) -> Result<Proof, ProofError>;
}

/// development prover/verifier pair
#[derive(Clone)]
pub struct DevProofSystem<H: CommitmentHasher> {
    hasher: H,
    height: usize,
    key: [u8; 32],
}

impl<H: CommitmentHasher> DevProofSystem<H> {
    /// `key` plays the role of the setup; prover and verifier must share it
    pub fn new(hasher: H, height: u8, key: [u8; 32]) -> Self {
        Self {
            hasher,
            height: height as usize,
            key,
        }
    }

    /// check the relation in the clear
    fn check_witness(&self, witness: &WithdrawWitness, public: &PublicSignals) -> Result<(), ProofError> {
        let path = &witness.path;
        if path.height() != self.height || path.directions.len() != self.height {
            return Err(ProofError::HeightMismatch {
                expected: self.height,
                got: path.height(),
            });
        }

        let leaf = Commitment::derive(&self.hasher, &witness.nullifier);
        if !path.verify(&self.hasher, &leaf.0, &public.root) {
            return Err(ProofError::WitnessMismatch(
                "commitment not authenticated against root".into(),
            ));
        }

        let expected = NullifierHash::derive(&self.hasher, &witness.nullifier, path.leaf_index());
        if expected != public.nullifier_hash {
            return Err(ProofError::WitnessMismatch(
                "nullifier hash does not match leaf position".into(),
            ));
        }
        Ok(())
    }

    /// keyed xof over the ordered signals, split into a, b, c
    fn transcript(&self, public_signals: &[Hash]) -> Proof {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(DEV_TRANSCRIPT_DOMAIN);
        for signal in public_signals {
            hasher.update(signal);
        }
        let mut out = [0u8; PROOF_LEN];
        hasher.finalize_xof().fill(&mut out);

        let mut proof = Proof {
            a: [0u8; 64],
            b: [0u8; 128],
            c: [0u8; 64],
        };
        proof.a.copy_from_slice(&out[..64]);
        proof.b.copy_from_slice(&out[64..192]);
        proof.c.copy_from_slice(&out[192..]);
        proof
    }
}

impl<H: CommitmentHasher> Prover for DevProofSystem<H> {
    fn prove(&self, witness: &WithdrawWitness, public: &PublicSignals) -> Result<Proof, ProofError> {
        self.check_witness(witness, public)?;
        Ok(self.transcript(&public.to_field_elements()))
    }
}

impl<H: CommitmentHasher> ProofVerifier for DevProofSystem<H> {
    fn verify(&self, proof: &Proof, public_signals: &[Hash]) -> bool {
        if public_signals.len() != PUBLIC_SIGNALS_LEN {
            return false;
        }
        let expected = self.transcript(public_signals);
        // compare every byte, no early exit
        expected
            .to_bytes()
            .iter()
            .zip(proof.to_bytes().iter())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
    }
}
