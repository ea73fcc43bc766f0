//! pool event log
//!
//! deposits are emitted in insertion order and are the only thing an
//! observer needs to rebuild the tree. every event carries a sequence
//! number; readers poll with [`EventLog::since`].

use merkle_tree::Hash;
use serde::{Deserialize, Serialize};

use crate::commitment::{Commitment, NullifierHash};
use crate::value::{Address, Amount};

/// a commitment was inserted at `leaf_index`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub commitment: Commitment,
    pub leaf_index: u64,
}

/// a nullifier hash was spent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    pub recipient: Address,
    pub nullifier_hash: NullifierHash,
    pub relayer: Address,
    pub fee: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolEvent {
    Deposit(DepositEvent),
    Withdrawal(WithdrawalEvent),
}

impl PoolEvent {
    pub fn as_deposit(&self) -> Option<&DepositEvent> {
        match self {
            PoolEvent::Deposit(d) => Some(d),
            PoolEvent::Withdrawal(_) => None,
        }
    }

    pub fn as_withdrawal(&self) -> Option<&WithdrawalEvent> {
        match self {
            PoolEvent::Withdrawal(w) => Some(w),
            PoolEvent::Deposit(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: PoolEvent,
}

const LOG_DIGEST_DOMAIN: &[u8] = b"shielded-pool.event-log.v1";

/// append-only, sequence numbers are dense from 0
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<SequencedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: PoolEvent) -> u64 {
        let seq = self.events.len() as u64;
        self.events.push(SequencedEvent { seq, event });
        seq
    }

    /// copies of every event with `seq >= from`
    pub fn since(&self, from: u64) -> Vec<SequencedEvent> {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.events.len());
        self.events[start..].to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequencedEvent> {
        self.events.iter()
    }

    pub fn deposits(&self) -> impl Iterator<Item = &DepositEvent> {
        self.events.iter().filter_map(|e| e.event.as_deposit())
    }

    pub fn withdrawals(&self) -> impl Iterator<Item = &WithdrawalEvent> {
        self.events.iter().filter_map(|e| e.event.as_withdrawal())
    }

    /// sequence number the next event will get
    pub fn next_seq(&self) -> u64 {
        self.events.len() as u64
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// blake3 over every event in order, fixed-width fields
    pub fn digest(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(LOG_DIGEST_DOMAIN);
        for entry in &self.events {
            hasher.update(&entry.seq.to_be_bytes());
            match &entry.event {
                PoolEvent::Deposit(d) => {
                    hasher.update(&[0]);
                    hasher.update(&d.commitment.0);
                    hasher.update(&d.leaf_index.to_be_bytes());
                }
                PoolEvent::Withdrawal(w) => {
                    hasher.update(&[1]);
                    hasher.update(&w.recipient.0);
                    hasher.update(&w.nullifier_hash.0);
                    hasher.update(&w.relayer.0);
                    hasher.update(&w.fee.to_be_bytes());
                }
            }
        }
        *hasher.finalize().as_bytes()
    }

    /// sequence numbers are dense and start at 0
    pub(crate) fn is_well_formed(&self) -> bool {
        self.events
            .iter()
            .enumerate()
            .all(|(i, e)| e.seq == i as u64)
    }
}
