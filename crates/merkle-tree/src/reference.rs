//! dense root computation
//!
//! recomputes a root from scratch, layer by layer, padding every odd layer
//! with that level's empty-subtree hash. this is the definition the
//! incremental tree has to agree with.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, TreeError};
use crate::hasher::{CommitmentHasher, Hash};

/// wide layers are hashed in parallel
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 128;

/// `zeros[l]` is the root of an empty subtree of height `l`, for `l` in `0..=height`
pub fn zero_hashes<H: CommitmentHasher>(hasher: &H, height: u8) -> Vec<Hash> {
    let mut zeros = Vec::with_capacity(height as usize + 1);
    let mut current = hasher.zero_leaf();
    zeros.push(current);
    for _ in 0..height {
        current = hasher.hash2(&current, &current);
        zeros.push(current);
    }
    zeros
}

/// root of a tree of `height` holding `leaves`, padded with empty subtrees
pub fn compute_root_from_leaves<H: CommitmentHasher>(
    hasher: &H,
    height: u8,
    leaves: &[Hash],
) -> Result<Hash> {
    let capacity = 1u64 << height;
    if leaves.len() as u64 > capacity {
        return Err(TreeError::TreeFull { capacity });
    }

    let zeros = zero_hashes(hasher, height);
    let mut layer = leaves.to_vec();

    for level in 0..height as usize {
        if layer.len() % 2 == 1 {
            layer.push(zeros[level]);
        }
        layer = hash_layer(hasher, &layer);
    }

    Ok(layer.first().copied().unwrap_or(zeros[height as usize]))
}

fn hash_layer<H: CommitmentHasher>(hasher: &H, layer: &[Hash]) -> Vec<Hash> {
    #[cfg(feature = "parallel")]
    if layer.len() >= PARALLEL_THRESHOLD {
        return layer
            .par_chunks_exact(2)
            .map(|pair| hasher.hash2(&pair[0], &pair[1]))
            .collect();
    }

    layer
        .chunks_exact(2)
        .map(|pair| hasher.hash2(&pair[0], &pair[1]))
        .collect()
}
