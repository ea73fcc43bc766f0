//! withdrawal validation order and root window behaviour

mod common;

use common::*;
use shielded_pool::{Blake3Hasher, Deposit, PoolError, RootRef, RootSelection};

#[test]
fn test_stale_root_inside_window_accepted() {
    let (mut pool, system) = pool(8, 4);
    let mut rng = rng(10);
    let note = deposit(&mut pool, &mut rng);

    // proof against the root right after our deposit
    let request = request_for(&pool, &system, &note, RootSelection::At(1), 0);
    for _ in 0..3 {
        deposit(&mut pool, &mut rng);
    }
    // roots 1..=4 are retained
    assert!(pool.is_known_root(&request.root));
    pool.withdraw(&request).unwrap();
}

#[test]
fn test_root_evicted_after_history_size_deposits() {
    let (mut pool, system) = pool(8, 4);
    let mut rng = rng(11);
    let note = deposit(&mut pool, &mut rng);
    let request = request_for(&pool, &system, &note, RootSelection::Latest, 0);

    for _ in 0..4 {
        deposit(&mut pool, &mut rng);
    }
    assert!(!pool.is_known_root(&request.root));
    assert_eq!(
        pool.withdraw(&request),
        Err(PoolError::UnknownRoot(RootRef::Hash(request.root)))
    );
    assert!(!pool.is_spent(&request.nullifier_hash));

    // a fresh proof against the current root works
    let fresh = request_for(&pool, &system, &note, RootSelection::Latest, 0);
    pool.withdraw(&fresh).unwrap();
}

#[test]
fn test_evicted_root_index_reports_unknown() {
    let (mut pool, _) = pool(8, 2);
    let mut rng = rng(12);
    for _ in 0..3 {
        deposit(&mut pool, &mut rng);
    }
    assert_eq!(pool.root_at(0), Err(PoolError::UnknownRoot(RootRef::Index(0))));
    assert!(pool.root_at(2).is_ok());
    assert!(pool.root_at(3).is_ok());
    assert!(pool.root_at(4).is_err());
}

#[test]
fn test_tampered_signals_rejected() {
    let (mut pool, system) = pool(8, 30);
    let mut rng = rng(13);
    let note = deposit(&mut pool, &mut rng);
    deposit(&mut pool, &mut rng);
    let request = request_for(&pool, &system, &note, RootSelection::Latest, 5);

    let mut other_recipient = request.clone();
    other_recipient.recipient = RELAYER;
    assert_eq!(pool.withdraw(&other_recipient), Err(PoolError::InvalidProof));

    let mut other_relayer = request.clone();
    other_relayer.relayer = RECIPIENT;
    assert_eq!(pool.withdraw(&other_relayer), Err(PoolError::InvalidProof));

    let mut other_fee = request.clone();
    other_fee.fee = 6;
    assert_eq!(pool.withdraw(&other_fee), Err(PoolError::InvalidProof));

    // a known but different root still has to match the proof
    let mut other_root = request.clone();
    other_root.root = pool.root_at(1).unwrap();
    assert_eq!(pool.withdraw(&other_root), Err(PoolError::InvalidProof));

    let mut bad_proof = request.clone();
    bad_proof.proof.c[0] ^= 1;
    assert_eq!(pool.withdraw(&bad_proof), Err(PoolError::InvalidProof));

    assert_eq!(pool.spent_count(), 0);
    pool.withdraw(&request).unwrap();
}

#[test]
fn test_fee_bound() {
    let (mut pool, system) = pool(8, 30);
    let mut rng = rng(14);
    let note = deposit(&mut pool, &mut rng);

    let too_high = request_for(&pool, &system, &note, RootSelection::Latest, DENOM + 1);
    assert_eq!(
        pool.withdraw(&too_high),
        Err(PoolError::FeeExceedsDenomination {
            fee: DENOM + 1,
            denomination: DENOM
        })
    );

    let whole = request_for(&pool, &system, &note, RootSelection::Latest, DENOM);
    let receipt = pool.withdraw(&whole).unwrap();
    assert_eq!(receipt.payouts[0].amount, 0);
    assert_eq!(receipt.payouts[1].amount, DENOM);
}

#[test]
fn test_spent_check_precedes_root_check() {
    let (mut pool, system) = pool(8, 2);
    let mut rng = rng(15);
    let note = deposit(&mut pool, &mut rng);
    let request = request_for(&pool, &system, &note, RootSelection::Latest, 0);
    pool.withdraw(&request).unwrap();

    // push the root out of the window, spent still wins
    for _ in 0..3 {
        deposit(&mut pool, &mut rng);
    }
    assert!(!pool.is_known_root(&request.root));
    assert_eq!(
        pool.withdraw(&request),
        Err(PoolError::AlreadySpent(request.nullifier_hash))
    );
}

#[test]
fn test_inputs_for_someone_elses_leaf_are_refused() {
    let (mut pool, _) = pool(8, 30);
    let mut rng = rng(16);
    let _theirs = deposit(&mut pool, &mut rng);

    // never deposited, leaf 0 holds someone else's commitment
    let mut mine = Deposit::from_rng(&mut rng);
    mine.assign_leaf_index(0).unwrap();
    let mirror = mirror_of(&pool);
    assert!(shielded_pool::prepare_withdrawal(
        &mine,
        &mirror,
        RootSelection::Latest,
        RECIPIENT,
        RELAYER,
        0
    )
    .is_err());

    let h = Blake3Hasher;
    assert!(!pool.contains_commitment(&mine.commitment(&h)));
}
