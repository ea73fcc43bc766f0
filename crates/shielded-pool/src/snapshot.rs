//! pool persistence
//!
//! a snapshot stores the config and the event log, plus the root, balance and
//! log digest they should produce. restoring replays the log into a fresh pool
//! and refuses the snapshot if any check value disagrees. the root only pins
//! deposits; the digest is what pins which nullifier hashes were spent.

use merkle_tree::{CommitmentHasher, Hash};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::events::{EventLog, PoolEvent};
use crate::pool::Pool;
use crate::proof::ProofVerifier;
use crate::value::Amount;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub config: PoolConfig,
    pub events: EventLog,
    pub root: Hash,
    pub balance: Amount,
    /// [`EventLog::digest`] of `events`
    pub events_digest: Hash,
}

impl PoolSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl<H: CommitmentHasher, V: ProofVerifier> Pool<H, V> {
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            config: self.config().clone(),
            events: self.events().clone(),
            root: self.root(),
            balance: self.balance(),
            events_digest: self.events().digest(),
        }
    }

    /// rebuild a pool by replaying a snapshot's event log
    pub fn restore(hasher: H, verifier: V, snapshot: &PoolSnapshot) -> Result<Self> {
        if !snapshot.events.is_well_formed() {
            return Err(PoolError::SnapshotMismatch(
                "event sequence numbers are not dense".into(),
            ));
        }

        let mut pool = Pool::new(hasher, verifier, snapshot.config.clone())?;
        let denomination = pool.denomination();

        for entry in snapshot.events.iter() {
            let replayed = match &entry.event {
                PoolEvent::Deposit(deposit) => pool
                    .deposit(deposit.commitment, denomination)
                    .and_then(|index| {
                        if index == deposit.leaf_index {
                            Ok(())
                        } else {
                            Err(PoolError::SnapshotMismatch(format!(
                                "deposit logged at {} replayed at {index}",
                                deposit.leaf_index
                            )))
                        }
                    }),
                PoolEvent::Withdrawal(withdrawal) => pool.replay_withdrawal(withdrawal),
            };
            replayed.map_err(|e| match e {
                PoolError::SnapshotMismatch(_) => e,
                other => PoolError::SnapshotMismatch(format!("event {}: {other}", entry.seq)),
            })?;
        }

        if pool.root() != snapshot.root {
            return Err(PoolError::SnapshotMismatch(format!(
                "root 0x{} does not match recorded 0x{}",
                hex::encode(pool.root()),
                hex::encode(snapshot.root)
            )));
        }
        if pool.balance() != snapshot.balance {
            return Err(PoolError::SnapshotMismatch(format!(
                "balance {} does not match recorded {}",
                pool.balance(),
                snapshot.balance
            )));
        }

        let digest = pool.events().digest();
        if digest != snapshot.events_digest {
            return Err(PoolError::SnapshotMismatch(format!(
                "event log digest 0x{} does not match recorded 0x{}",
                hex::encode(digest),
                hex::encode(snapshot.events_digest)
            )));
        }

        info!(
            events = snapshot.events.len(),
            leaves = pool.next_index(),
            "pool restored"
        );
        Ok(pool)
    }
}
