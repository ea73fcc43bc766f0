//! incremental merkle tree
//!
//! append-only binary tree of fixed height. every insert recomputes one
//! leaf-to-root path against the cached nodes of each level, falling back to
//! the precomputed empty-subtree hash wherever a sibling does not exist yet,
//! and records the new root in the [`RootHistory`].

use tracing::debug;

use crate::error::{Result, TreeError};
use crate::hasher::{CommitmentHasher, Hash};
use crate::history::RootHistory;
use crate::path::{Direction, MerklePath};
use crate::reference::zero_hashes;

/// maximum supported height (2^32 leaves)
pub const MAX_HEIGHT: u8 = 32;

#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree<H: CommitmentHasher> {
    hasher: H,
    height: u8,
    /// levels[0] are the leaves, levels[l] the occupied nodes at level l
    levels: Vec<Vec<Hash>>,
    /// zeros[l] is the root of an empty subtree of height l
    zeros: Vec<Hash>,
    history: RootHistory,
}

impl<H: CommitmentHasher> IncrementalMerkleTree<H> {
    /// empty tree of `height` retaining the last `history_size` roots
    pub fn new(hasher: H, height: u8, history_size: usize) -> Result<Self> {
        if height == 0 || height > MAX_HEIGHT {
            return Err(TreeError::InvalidHeight(height));
        }

        let zeros = zero_hashes(&hasher, height);
        let history = RootHistory::new(history_size, zeros[height as usize])?;

        Ok(Self {
            hasher,
            height,
            levels: vec![Vec::new(); height as usize],
            zeros,
            history,
        })
    }

    /// append `value` as the next leaf, returns its index
    pub fn insert(&mut self, value: Hash) -> Result<u64> {
        let index = self.len();
        let capacity = self.capacity();
        if index >= capacity {
            return Err(TreeError::TreeFull { capacity });
        }

        let mut current = value;
        for level in 0..self.height as usize {
            let position = (index >> level) as usize;

            let nodes = &mut self.levels[level];
            if position < nodes.len() {
                nodes[position] = current;
            } else {
                nodes.push(current);
            }

            let sibling = self.node(level, position ^ 1);
            current = Direction::of(index, level).combine(&self.hasher, &current, &sibling);
        }

        let seq = self.history.push(current);
        debug!(
            leaf_index = index,
            root_index = seq,
            root = %hex::encode(&current[..8]),
            "leaf inserted"
        );

        Ok(index)
    }

    /// most recent root
    pub fn root(&self) -> Hash {
        self.history.latest()
    }

    /// root after the k-th insertion (k = 0 is the empty tree)
    pub fn root_at(&self, k: u64) -> Result<Hash> {
        self.history.get(k)
    }

    /// whether `root` is one of the retained roots
    pub fn contains_root(&self, root: &Hash) -> bool {
        self.history.contains(root)
    }

    /// authentication path for leaf `index`
    pub fn path(&self, index: u64) -> Result<MerklePath> {
        let count = self.len();
        if index >= count {
            return Err(TreeError::IndexOutOfRange { index, count });
        }

        let height = self.height as usize;
        let mut siblings = Vec::with_capacity(height);
        let mut directions = Vec::with_capacity(height);

        for level in 0..height {
            let position = (index >> level) as usize;
            siblings.push(self.node(level, position ^ 1));
            directions.push(Direction::of(index, level));
        }

        Ok(MerklePath {
            siblings,
            directions,
        })
    }

    pub fn leaf(&self, index: u64) -> Option<Hash> {
        self.levels[0].get(index as usize).copied()
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// number of leaves
    pub fn len(&self) -> u64 {
        self.levels[0].len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// 2^height
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    /// empty-subtree hash at `level`
    pub fn zero_hash(&self, level: usize) -> Option<Hash> {
        self.zeros.get(level).copied()
    }

    pub fn history(&self) -> &RootHistory {
        &self.history
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    fn node(&self, level: usize, position: usize) -> Hash {
        self.levels[level]
            .get(position)
            .copied()
            .unwrap_or(self.zeros[level])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{Blake3Hasher, Sha256Hasher};
    use crate::reference::compute_root_from_leaves;

    fn leaf(seed: u8) -> Hash {
        [seed; 32]
    }

    #[test]
    fn test_invalid_height() {
        assert_eq!(
            IncrementalMerkleTree::new(Blake3Hasher, 0, 8).unwrap_err(),
            TreeError::InvalidHeight(0)
        );
        assert_eq!(
            IncrementalMerkleTree::new(Blake3Hasher, 33, 8).unwrap_err(),
            TreeError::InvalidHeight(33)
        );
        assert_eq!(
            IncrementalMerkleTree::new(Blake3Hasher, 4, 0).unwrap_err(),
            TreeError::InvalidHistorySize
        );
    }

    #[test]
    fn test_empty_tree() {
        let tree = IncrementalMerkleTree::new(Blake3Hasher, 20, 30).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), tree.zero_hash(20).unwrap());
        assert_eq!(tree.root_at(0).unwrap(), tree.root());
        assert_eq!(tree.capacity(), 1 << 20);
    }

    #[test]
    fn test_insert_assigns_sequential_indices() {
        let mut tree = IncrementalMerkleTree::new(Blake3Hasher, 20, 30).unwrap();
        let empty_root = tree.root();

        assert_eq!(tree.insert(leaf(1)).unwrap(), 0);
        assert_eq!(tree.insert(leaf(2)).unwrap(), 1);
        assert_eq!(tree.insert(leaf(3)).unwrap(), 2);

        assert_eq!(tree.len(), 3);
        assert_ne!(tree.root_at(1).unwrap(), empty_root);
        assert_ne!(tree.root_at(1).unwrap(), tree.root_at(2).unwrap());
        assert_eq!(tree.root_at(3).unwrap(), tree.root());
    }

    #[test]
    fn test_two_leaf_root_by_hand() {
        let h = Blake3Hasher;
        let mut tree = IncrementalMerkleTree::new(h, 2, 8).unwrap();
        let a = leaf(1);
        let b = leaf(2);
        tree.insert(a).unwrap();
        tree.insert(b).unwrap();

        let z1 = tree.zero_hash(1).unwrap();
        // left operand first at every level
        assert_eq!(tree.root(), h.hash2(&h.hash2(&a, &b), &z1));
        assert_ne!(tree.root(), h.hash2(&h.hash2(&b, &a), &z1));

        let path = tree.path(1).unwrap();
        assert_eq!(path.directions, vec![Direction::Right, Direction::Left]);
        assert_eq!(path.siblings, vec![a, z1]);
    }

    fn assert_matches_dense<H: CommitmentHasher>(h: H) {
        let mut tree = IncrementalMerkleTree::new(h.clone(), 5, 64).unwrap();
        for i in 0..20u8 {
            tree.insert(leaf(i)).unwrap();
            let expected = compute_root_from_leaves(&h, 5, tree.leaves()).unwrap();
            assert_eq!(tree.root(), expected, "diverged after {} leaves", i + 1);
        }
    }

    #[test]
    fn test_matches_dense_root() {
        assert_matches_dense(Blake3Hasher);
        assert_matches_dense(Sha256Hasher);
    }

    #[test]
    fn test_paths_verify_against_current_root() {
        let h = Blake3Hasher;
        let mut tree = IncrementalMerkleTree::new(h, 4, 32).unwrap();
        for i in 0..11u8 {
            tree.insert(leaf(i)).unwrap();
        }
        let root = tree.root();

        for index in 0..tree.len() {
            let path = tree.path(index).unwrap();
            assert_eq!(path.height(), 4);
            assert_eq!(path.leaf_index(), index);
            assert!(path.verify(&h, &tree.leaf(index).unwrap(), &root));
        }

        // wrong leaf
        let path = tree.path(3).unwrap();
        assert!(!path.verify(&h, &leaf(200), &root));
    }

    #[test]
    fn test_old_path_verifies_old_root() {
        let h = Blake3Hasher;
        let mut tree = IncrementalMerkleTree::new(h, 8, 32).unwrap();
        tree.insert(leaf(1)).unwrap();
        let path_then = tree.path(0).unwrap();
        let root_then = tree.root();

        tree.insert(leaf(2)).unwrap();
        assert!(path_then.verify(&h, &leaf(1), &root_then));
        assert!(!path_then.verify(&h, &leaf(1), &tree.root()));
        assert!(tree.path(0).unwrap().verify(&h, &leaf(1), &tree.root()));
    }

    #[test]
    fn test_tree_full_leaves_state_unchanged() {
        let mut tree = IncrementalMerkleTree::new(Blake3Hasher, 2, 8).unwrap();
        for i in 0..4u8 {
            tree.insert(leaf(i)).unwrap();
        }
        assert!(tree.is_full());

        let root = tree.root();
        assert_eq!(
            tree.insert(leaf(9)),
            Err(TreeError::TreeFull { capacity: 4 })
        );
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root(), root);
        assert_eq!(tree.history().latest_index(), 4);
    }

    #[test]
    fn test_path_out_of_range() {
        let mut tree = IncrementalMerkleTree::new(Blake3Hasher, 4, 8).unwrap();
        assert_eq!(
            tree.path(0),
            Err(TreeError::IndexOutOfRange { index: 0, count: 0 })
        );
        tree.insert(leaf(1)).unwrap();
        assert!(tree.path(0).is_ok());
        assert_eq!(
            tree.path(1),
            Err(TreeError::IndexOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn test_history_window() {
        let mut tree = IncrementalMerkleTree::new(Blake3Hasher, 8, 3).unwrap();
        let empty_root = tree.root();
        for i in 0..3u8 {
            tree.insert(leaf(i)).unwrap();
        }

        // roots #1..=#3 retained, #0 evicted
        assert!(!tree.contains_root(&empty_root));
        assert_eq!(tree.root_at(0), Err(TreeError::UnknownRoot { index: 0 }));
        for k in 1..=3 {
            assert!(tree.contains_root(&tree.root_at(k).unwrap()));
        }
    }
}
