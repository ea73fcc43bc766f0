//! shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use shielded_pool::{
    prepare_withdrawal, Address, Amount, Blake3Hasher, Deposit, DevProofSystem, Pool, PoolConfig,
    RootSelection, TreeMirror, WithdrawRequest,
};

pub const DENOM: Amount = 1_000;
pub const RECIPIENT: Address = Address([0x11; 32]);
pub const RELAYER: Address = Address([0x22; 32]);

pub type DevSystem = Arc<DevProofSystem<Blake3Hasher>>;
pub type TestPool = Pool<Blake3Hasher, DevSystem>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn config(height: u8, history: u32) -> PoolConfig {
    PoolConfig::new(DENOM)
        .with_tree_height(height)
        .with_root_history_size(history)
}

pub fn dev_system(height: u8) -> DevSystem {
    Arc::new(DevProofSystem::new(Blake3Hasher, height, [7u8; 32]))
}

/// pool plus the proof system its verifier shares with the prover
pub fn pool(height: u8, history: u32) -> (TestPool, DevSystem) {
    init_tracing();
    let system = dev_system(height);
    let pool = Pool::new(Blake3Hasher, Arc::clone(&system), config(height, history)).unwrap();
    (pool, system)
}

pub fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// deposit a fresh note, returns it with its leaf index assigned
pub fn deposit(pool: &mut TestPool, rng: &mut ChaCha20Rng) -> Deposit {
    let mut note = Deposit::from_rng(rng);
    let index = pool.deposit(note.commitment(&Blake3Hasher), DENOM).unwrap();
    note.assign_leaf_index(index).unwrap();
    note
}

pub fn mirror_of(pool: &TestPool) -> TreeMirror<Blake3Hasher> {
    TreeMirror::replay(Blake3Hasher, pool.config(), pool.events().iter()).unwrap()
}

/// full client path: mirror, inputs, proof
pub fn request_for(
    pool: &TestPool,
    system: &DevSystem,
    note: &Deposit,
    root: RootSelection,
    fee: Amount,
) -> WithdrawRequest {
    let mirror = mirror_of(pool);
    prepare_withdrawal(note, &mirror, root, RECIPIENT, RELAYER, fee)
        .unwrap()
        .prove(system.as_ref())
        .unwrap()
}
