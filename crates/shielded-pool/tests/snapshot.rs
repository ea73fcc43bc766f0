//! snapshot and restore

mod common;

use common::*;
use shielded_pool::{
    Blake3Hasher, Commitment, DepositEvent, Pool, PoolError, PoolEvent, PoolSnapshot,
    RootSelection,
};

fn populated() -> (TestPool, DevSystem, Vec<shielded_pool::Deposit>) {
    let (mut pool, system) = pool(8, 30);
    let mut rng = rng(30);
    let notes: Vec<_> = (0..6).map(|_| deposit(&mut pool, &mut rng)).collect();
    for note in &notes[..2] {
        let request = request_for(&pool, &system, note, RootSelection::Latest, 3);
        pool.withdraw(&request).unwrap();
    }
    (pool, system, notes)
}

#[test]
fn test_restore_roundtrip_through_json() {
    let (pool, system, notes) = populated();
    let json = pool.snapshot().to_json().unwrap();

    let snapshot = PoolSnapshot::from_json(&json).unwrap();
    let mut restored = Pool::restore(Blake3Hasher, system.clone(), &snapshot).unwrap();

    assert_eq!(restored.root(), pool.root());
    assert_eq!(restored.balance(), pool.balance());
    assert_eq!(restored.next_index(), pool.next_index());
    assert_eq!(restored.events(), pool.events());
    assert_eq!(restored.spent_count(), 2);

    // spent notes stay spent, the rest still withdraw
    let again = request_for(&restored, &system, &notes[0], RootSelection::Latest, 0);
    assert!(matches!(
        restored.withdraw(&again),
        Err(PoolError::AlreadySpent(_))
    ));
    let fresh = request_for(&restored, &system, &notes[4], RootSelection::Latest, 0);
    restored.withdraw(&fresh).unwrap();
}

#[test]
fn test_tampered_root_rejected() {
    let (pool, system, _) = populated();
    let mut snapshot = pool.snapshot();
    snapshot.root[0] ^= 1;
    assert!(matches!(
        Pool::restore(Blake3Hasher, system, &snapshot),
        Err(PoolError::SnapshotMismatch(_))
    ));
}

#[test]
fn test_tampered_balance_rejected() {
    let (pool, system, _) = populated();
    let mut snapshot = pool.snapshot();
    snapshot.balance += DENOM;
    assert!(matches!(
        Pool::restore(Blake3Hasher, system, &snapshot),
        Err(PoolError::SnapshotMismatch(_))
    ));
}

#[test]
fn test_tampered_event_rejected() {
    let (pool, system, _) = populated();
    let snapshot = pool.snapshot();

    // swap in a different commitment at the same position
    let mut json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
    let events = json["events"]["events"].as_array_mut().unwrap();
    let replacement = PoolEvent::Deposit(DepositEvent {
        commitment: Commitment([0x77; 32]),
        leaf_index: 0,
    });
    events[0]["event"] = serde_json::to_value(replacement).unwrap();

    let tampered: PoolSnapshot = serde_json::from_value(json).unwrap();
    assert!(matches!(
        Pool::restore(Blake3Hasher, system, &tampered),
        Err(PoolError::SnapshotMismatch(_))
    ));
}

#[test]
fn test_tampered_withdrawal_rejected() {
    let (pool, system, notes) = populated();
    let snapshot = pool.snapshot();

    // point the first withdrawal at a note that was never spent
    let unspent = notes[2].nullifier_hash(&Blake3Hasher).unwrap();
    let mut json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
    let events = json["events"]["events"].as_array_mut().unwrap();
    assert_eq!(events[6]["event"]["type"], "withdrawal");
    events[6]["event"]["nullifier_hash"] = serde_json::to_value(unspent).unwrap();

    let tampered: PoolSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(tampered.root, snapshot.root);
    assert_eq!(tampered.balance, snapshot.balance);
    assert!(matches!(
        Pool::restore(Blake3Hasher, system, &tampered),
        Err(PoolError::SnapshotMismatch(_))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let (pool, system, _) = populated();
    let mut snapshot = pool.snapshot();
    snapshot.config.denomination = 0;
    assert!(matches!(
        Pool::restore(Blake3Hasher, system, &snapshot),
        Err(PoolError::InvalidConfig(_))
    ));
}
