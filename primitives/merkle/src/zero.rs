//! Precomputed zero hashes for empty subtrees.
//!
//! Level 0 is the empty leaf (zero); level `n` is
//! `Poseidon₂(zero[n-1], zero[n-1])`. The table is computed once on first
//! access and cached for the life of the process.

use dp_zk_core::crypto::hash::poseidon_hash_2;
use dp_zk_core::Bn254Fr;
use once_cell::sync::Lazy;

use crate::incremental::TREE_DEPTH;

static ZERO_HASHES: Lazy<[Bn254Fr; TREE_DEPTH + 1]> = Lazy::new(|| {
	let mut hashes = [Bn254Fr::from(0u64); TREE_DEPTH + 1];
	for level in 1..=TREE_DEPTH {
		hashes[level] = poseidon_hash_2(&[hashes[level - 1], hashes[level - 1]]);
	}
	hashes
});

/// Zero hash for empty subtrees rooted at `level` (0 = leaf level).
///
/// # Panics
///
/// Panics if `level > TREE_DEPTH`; every caller indexes with a loop bound of
/// the tree depth.
pub fn zero_hash(level: usize) -> Bn254Fr {
	ZERO_HASHES[level]
}

/// Root of the completely empty depth-20 tree.
pub fn empty_root() -> Bn254Fr {
	zero_hash(TREE_DEPTH)
}
