//! # Incremental Merkle Tree
//!
//! The append-only deposit tree. Stores the "frontier" (the rightmost node
//! at each level) so every insert is O(depth), plus the full leaf sequence
//! so sibling paths can be served to provers.
//!
//! ```text
//!                    Root (level 20)
//!                   /              \
//!          H(0,0)                    H(0,1)
//!         /      \                  /      \
//!     H(1,0)    H(1,1)          H(1,2)    H(1,3)
//!     /    \    /    \          /    \    /    \
//!   L0    L1  L2    L3        L4    L5  L6    L7
//! ```
//!
//! The tree also keeps a rolling buffer of its last 100 roots. A proof built
//! against any root still in the buffer remains acceptable on-chain even as
//! further deposits roll the current root forward.

use std::collections::VecDeque;

use dp_zk_core::crypto::hash::poseidon_hash_2;
use dp_zk_core::{Bn254Fr, Commitment, MerkleRoot};

use crate::error::MerkleError;
use crate::zero::zero_hash;

/// Depth of the deposit tree (2^20 ≈ 1M leaves), fixed by the circuits
pub const TREE_DEPTH: usize = 20;

/// Number of historic roots kept valid
pub const KNOWN_ROOTS: usize = 100;

/// A sibling path from a leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
	/// Sibling hashes, leaf level first
	pub path_elements: [Bn254Fr; TREE_DEPTH],
	/// Direction bits: 0 = leaf side is the left child, 1 = right
	pub path_indices: [u8; TREE_DEPTH],
}

impl MerklePath {
	/// The all-zero path used for dummy circuit slots.
	pub fn zero() -> Self {
		Self {
			path_elements: [Bn254Fr::from(0u64); TREE_DEPTH],
			path_indices: [0u8; TREE_DEPTH],
		}
	}
}

/// Append-only Poseidon Merkle tree of depth 20 with rolling root history.
#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree {
	/// All inserted leaves, in insertion order
	leaves: Vec<Bn254Fr>,
	/// Rightmost node at each level
	frontier: [Bn254Fr; TREE_DEPTH],
	/// Current root
	root: MerkleRoot,
	/// FIFO of the last `KNOWN_ROOTS` roots (current root included)
	known_roots: VecDeque<MerkleRoot>,
}

impl Default for IncrementalMerkleTree {
	fn default() -> Self {
		Self::new()
	}
}

impl IncrementalMerkleTree {
	/// Create a new empty tree. The empty root starts out as a known root.
	pub fn new() -> Self {
		let root = zero_hash(TREE_DEPTH);
		let mut known_roots = VecDeque::with_capacity(KNOWN_ROOTS);
		known_roots.push_back(root);
		Self {
			leaves: Vec::new(),
			frontier: [Bn254Fr::from(0u64); TREE_DEPTH],
			root,
			known_roots,
		}
	}

	/// Maximum number of leaves.
	pub fn capacity(&self) -> u64 {
		1u64 << TREE_DEPTH
	}

	/// Whether the tree can take no further leaves.
	pub fn is_full(&self) -> bool {
		self.leaves.len() as u64 >= self.capacity()
	}

	/// Number of leaves inserted so far.
	pub fn leaf_count(&self) -> u64 {
		self.leaves.len() as u64
	}

	/// Current root.
	pub fn root(&self) -> MerkleRoot {
		self.root
	}

	/// Whether `root` is the current root or one of the last 100.
	pub fn is_known_root(&self, root: &MerkleRoot) -> bool {
		self.known_roots.contains(root)
	}

	/// Append a leaf and return its index.
	///
	/// Updates all ancestor hashes through the frontier and records the new
	/// root in the rolling history.
	pub fn insert(&mut self, leaf: Bn254Fr) -> Result<u64, MerkleError> {
		if self.is_full() {
			return Err(MerkleError::TreeFull);
		}

		let index = self.leaves.len() as u64;
		let mut current_hash = leaf;
		let mut current_index = index;

		for level in 0..TREE_DEPTH {
			if current_index % 2 == 0 {
				// Left child: remember it and hash against the empty subtree
				self.frontier[level] = current_hash;
				current_hash = poseidon_hash_2(&[current_hash, zero_hash(level)]);
			} else {
				// Right child: hash against the recorded left sibling
				current_hash = poseidon_hash_2(&[self.frontier[level], current_hash]);
			}
			current_index /= 2;
		}

		self.root = current_hash;
		self.leaves.push(leaf);
		self.record_root(current_hash);

		Ok(index)
	}

	/// FIFO rotation of the known-root buffer.
	fn record_root(&mut self, root: MerkleRoot) {
		if self.known_roots.len() >= KNOWN_ROOTS {
			self.known_roots.pop_front();
		}
		self.known_roots.push_back(root);
	}

	/// Generate the sibling path for `leaf_index`.
	///
	/// Rebuilds the populated part of each level and pads with zero hashes
	/// where the tree is still empty.
	pub fn proof(&self, leaf_index: u64) -> Result<MerklePath, MerkleError> {
		if leaf_index >= self.leaf_count() {
			return Err(MerkleError::LeafIndexOutOfRange {
				index: leaf_index,
				count: self.leaf_count(),
			});
		}

		let mut path_elements = [Bn254Fr::from(0u64); TREE_DEPTH];
		let mut path_indices = [0u8; TREE_DEPTH];

		let mut current_level = self.leaves.clone();
		let mut target_index = leaf_index as usize;

		for level in 0..TREE_DEPTH {
			let sibling_index = if target_index % 2 == 0 {
				path_indices[level] = 0;
				target_index + 1
			} else {
				path_indices[level] = 1;
				target_index - 1
			};

			path_elements[level] = if sibling_index < current_level.len() {
				current_level[sibling_index]
			} else {
				zero_hash(level)
			};

			// Compute the populated part of the next level
			let mut next_level = Vec::with_capacity(current_level.len() / 2 + 1);
			for chunk in current_level.chunks(2) {
				let left = chunk[0];
				let right = if chunk.len() > 1 { chunk[1] } else { zero_hash(level) };
				next_level.push(poseidon_hash_2(&[left, right]));
			}

			current_level = next_level;
			target_index /= 2;
		}

		Ok(MerklePath {
			path_elements,
			path_indices,
		})
	}

	/// Leaf index of a commitment, if present (linear scan; RPC-path only).
	pub fn leaf_index_of(&self, commitment: &Commitment) -> Option<u64> {
		self.leaves
			.iter()
			.position(|leaf| *leaf == commitment.inner())
			.map(|index| index as u64)
	}
}

/// Recompute a root from a leaf and its sibling path.
///
/// The withdraw builder uses this to place the attested historical root into
/// the public signals.
pub fn compute_root_from_path(leaf: Bn254Fr, path: &MerklePath) -> MerkleRoot {
	let mut current = leaf;
	for level in 0..TREE_DEPTH {
		current = if path.path_indices[level] == 0 {
			poseidon_hash_2(&[current, path.path_elements[level]])
		} else {
			poseidon_hash_2(&[path.path_elements[level], current])
		};
	}
	current
}

/// Verify a sibling path against an expected root.
pub fn verify_proof(root: &MerkleRoot, leaf: Bn254Fr, path: &MerklePath) -> bool {
	compute_root_from_path(leaf, path) == *root
}
