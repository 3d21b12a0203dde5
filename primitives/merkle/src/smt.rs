//! # Exclusion Sparse Merkle Tree
//!
//! Tracks the set of flagged commitments as an iden3-style sparse Merkle
//! tree and produces the non-membership witnesses the compliance circuit
//! verifies.
//!
//! ## Structure
//!
//! - Empty subtrees hash to `0`.
//! - A leaf for `(key, value)` hashes to `Poseidon₃(key, value, 1)` and sits
//!   at the shortest position where its key's path is unique (LSB-first path
//!   bits).
//! - Internal nodes hash to `Poseidon₂(left, right)`.
//!
//! Removal collapses lone leaves upward, so the tree shape is a pure
//! function of the flagged-key set: replaying any permutation of the same
//! set yields the same root. The tree is a set abstraction, not a log.

use std::collections::{BTreeSet, HashMap};

use ark_ff::{BigInteger, PrimeField};

use dp_zk_core::crypto::field::{to_be_bytes, mod_reduce};
use dp_zk_core::crypto::hash::{poseidon_hash_2, poseidon_hash_3};
use dp_zk_core::{Bn254Fr, Commitment, MerkleRoot};

use crate::error::MerkleError;
use crate::incremental::TREE_DEPTH;

/// A non-membership witness in the form the SMT circuit consumes.
///
/// `siblings` are ordered root-first and zero-padded to the fixed depth.
/// `(old_key, old_value)` describe the colliding leaf on the key's path, or
/// `is_old0` marks a path that terminates in an empty subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionWitness {
	pub exclusion_root: MerkleRoot,
	pub siblings: [Bn254Fr; TREE_DEPTH],
	pub old_key: Bn254Fr,
	pub old_value: Bn254Fr,
	pub is_old0: bool,
}

#[derive(Clone, Debug)]
enum Node {
	Internal { left: Bn254Fr, right: Bn254Fr },
	Leaf { key: Bn254Fr, value: Bn254Fr },
}

/// Sparse Merkle tree over flagged commitments (`value = 1` per key).
#[derive(Clone, Debug)]
pub struct ExclusionSmt {
	/// Content-addressed node storage, keyed by node hash
	nodes: HashMap<[u8; 32], Node>,
	/// Current root; zero when the set is empty
	root: MerkleRoot,
	/// The flagged-key set, in canonical byte order (checkpoint source)
	flagged: BTreeSet<[u8; 32]>,
}

impl Default for ExclusionSmt {
	fn default() -> Self {
		Self::new()
	}
}

impl ExclusionSmt {
	/// Create an empty exclusion tree.
	pub fn new() -> Self {
		Self {
			nodes: HashMap::new(),
			root: Bn254Fr::from(0u64),
			flagged: BTreeSet::new(),
		}
	}

	/// Rebuild a tree from a flagged-key set (checkpoint load path).
	pub fn from_flagged<I>(keys: I) -> Result<Self, MerkleError>
	where
		I: IntoIterator<Item = Commitment>,
	{
		let mut tree = Self::new();
		for key in keys {
			tree.insert_flag(&key)?;
		}
		Ok(tree)
	}

	/// Current root of the exclusion set.
	pub fn root(&self) -> MerkleRoot {
		self.root
	}

	/// Number of flagged commitments.
	pub fn len(&self) -> usize {
		self.flagged.len()
	}

	/// Whether no commitment is flagged.
	pub fn is_empty(&self) -> bool {
		self.flagged.is_empty()
	}

	/// Whether `commitment` is in the exclusion set.
	pub fn is_flagged(&self, commitment: &Commitment) -> bool {
		self.flagged.contains(&to_be_bytes(&commitment.inner()))
	}

	/// The flagged keys in canonical order.
	pub fn flagged_keys(&self) -> Vec<Commitment> {
		self.flagged
			.iter()
			.map(|bytes| Commitment::new(mod_reduce(bytes)))
			.collect()
	}

	/// Flag a commitment. Idempotent: re-flagging leaves the root unchanged.
	pub fn insert_flag(&mut self, commitment: &Commitment) -> Result<MerkleRoot, MerkleError> {
		let key_bytes = to_be_bytes(&commitment.inner());
		if self.flagged.contains(&key_bytes) {
			return Ok(self.root);
		}

		let bits = path_bits(&commitment.inner());
		let new_root =
			self.insert_rec(self.root, &bits, 0, commitment.inner(), Bn254Fr::from(1u64))?;
		self.root = new_root;
		self.flagged.insert(key_bytes);
		Ok(new_root)
	}

	/// Unflag a commitment. Idempotent on absent keys.
	pub fn remove_flag(&mut self, commitment: &Commitment) -> Result<MerkleRoot, MerkleError> {
		let key_bytes = to_be_bytes(&commitment.inner());
		if !self.flagged.contains(&key_bytes) {
			return Ok(self.root);
		}

		let bits = path_bits(&commitment.inner());
		let new_root = self.delete_rec(self.root, &bits, 0, &commitment.inner())?;
		self.root = new_root;
		self.flagged.remove(&key_bytes);
		Ok(new_root)
	}

	/// Build the non-membership witness for `commitment`.
	///
	/// Fails with `CannotProveExclusion` when the commitment is flagged.
	pub fn non_membership_witness(
		&self,
		commitment: &Commitment,
	) -> Result<ExclusionWitness, MerkleError> {
		if self.is_flagged(commitment) {
			return Err(MerkleError::CannotProveExclusion);
		}

		let bits = path_bits(&commitment.inner());
		let mut siblings = [Bn254Fr::from(0u64); TREE_DEPTH];
		let mut level = 0usize;
		let mut current = self.root;

		loop {
			if current == Bn254Fr::from(0u64) {
				// Path ends in an empty subtree
				return Ok(ExclusionWitness {
					exclusion_root: self.root,
					siblings,
					old_key: Bn254Fr::from(0u64),
					old_value: Bn254Fr::from(0u64),
					is_old0: true,
				});
			}

			match self.node(&current)? {
				Node::Leaf { key, value } => {
					// A different leaf shares the path prefix
					return Ok(ExclusionWitness {
						exclusion_root: self.root,
						siblings,
						old_key: *key,
						old_value: *value,
						is_old0: false,
					});
				}
				Node::Internal { left, right } => {
					if level >= TREE_DEPTH {
						return Err(MerkleError::SmtCorruption(
							"internal node below maximum depth".to_string(),
						));
					}
					if bits[level] {
						siblings[level] = *left;
						current = *right;
					} else {
						siblings[level] = *right;
						current = *left;
					}
					level += 1;
				}
			}
		}
	}

	// ------------------------------------------------------------------
	// Internal tree manipulation
	// ------------------------------------------------------------------

	fn node(&self, hash: &Bn254Fr) -> Result<&Node, MerkleError> {
		self.nodes
			.get(&to_be_bytes(hash))
			.ok_or_else(|| MerkleError::SmtCorruption("missing node for hash".to_string()))
	}

	fn store_leaf(&mut self, key: Bn254Fr, value: Bn254Fr) -> Bn254Fr {
		let hash = poseidon_hash_3(&[key, value, Bn254Fr::from(1u64)]);
		self.nodes.insert(to_be_bytes(&hash), Node::Leaf { key, value });
		hash
	}

	fn store_internal(&mut self, left: Bn254Fr, right: Bn254Fr) -> Bn254Fr {
		let hash = poseidon_hash_2(&[left, right]);
		self.nodes
			.insert(to_be_bytes(&hash), Node::Internal { left, right });
		hash
	}

	fn insert_rec(
		&mut self,
		node: Bn254Fr,
		bits: &[bool],
		level: usize,
		key: Bn254Fr,
		value: Bn254Fr,
	) -> Result<Bn254Fr, MerkleError> {
		if node == Bn254Fr::from(0u64) {
			return Ok(self.store_leaf(key, value));
		}

		match self.node(&node)?.clone() {
			Node::Leaf {
				key: old_key,
				value: old_value,
			} => self.split(key, value, old_key, old_value, bits, level),
			Node::Internal { left, right } => {
				if level >= TREE_DEPTH {
					return Err(MerkleError::SmtCorruption(
						"internal node below maximum depth".to_string(),
					));
				}
				if bits[level] {
					let new_right = self.insert_rec(right, bits, level + 1, key, value)?;
					Ok(self.store_internal(left, new_right))
				} else {
					let new_left = self.insert_rec(left, bits, level + 1, key, value)?;
					Ok(self.store_internal(new_left, right))
				}
			}
		}
	}

	/// Push two colliding leaves down until their paths diverge.
	fn split(
		&mut self,
		new_key: Bn254Fr,
		new_value: Bn254Fr,
		old_key: Bn254Fr,
		old_value: Bn254Fr,
		bits: &[bool],
		level: usize,
	) -> Result<Bn254Fr, MerkleError> {
		if level >= TREE_DEPTH {
			return Err(MerkleError::SmtCorruption(format!(
				"key prefix collision beyond depth {TREE_DEPTH}"
			)));
		}

		let old_bits = path_bits(&old_key);
		if bits[level] != old_bits[level] {
			let new_leaf = self.store_leaf(new_key, new_value);
			let old_leaf = self.store_leaf(old_key, old_value);
			let (left, right) = if bits[level] {
				(old_leaf, new_leaf)
			} else {
				(new_leaf, old_leaf)
			};
			Ok(self.store_internal(left, right))
		} else {
			let child = self.split(new_key, new_value, old_key, old_value, bits, level + 1)?;
			if bits[level] {
				Ok(self.store_internal(Bn254Fr::from(0u64), child))
			} else {
				Ok(self.store_internal(child, Bn254Fr::from(0u64)))
			}
		}
	}

	fn delete_rec(
		&mut self,
		node: Bn254Fr,
		bits: &[bool],
		level: usize,
		key: &Bn254Fr,
	) -> Result<Bn254Fr, MerkleError> {
		if node == Bn254Fr::from(0u64) {
			return Err(MerkleError::SmtCorruption(
				"flagged key has no leaf on its path".to_string(),
			));
		}

		match self.node(&node)?.clone() {
			Node::Leaf { key: k, .. } => {
				if k == *key {
					Ok(Bn254Fr::from(0u64))
				} else {
					Err(MerkleError::SmtCorruption(
						"flagged key resolves to a different leaf".to_string(),
					))
				}
			}
			Node::Internal { left, right } => {
				if level >= TREE_DEPTH {
					return Err(MerkleError::SmtCorruption(
						"internal node below maximum depth".to_string(),
					));
				}
				if bits[level] {
					let new_right = self.delete_rec(right, bits, level + 1, key)?;
					self.join(left, new_right)
				} else {
					let new_left = self.delete_rec(left, bits, level + 1, key)?;
					self.join(new_left, right)
				}
			}
		}
	}

	/// Rebuild an internal node after deletion, collapsing lone leaves
	/// upward to keep the tree canonical.
	fn join(&mut self, left: Bn254Fr, right: Bn254Fr) -> Result<Bn254Fr, MerkleError> {
		let zero = Bn254Fr::from(0u64);
		if left == zero && right == zero {
			return Ok(zero);
		}
		if left == zero && self.is_leaf(&right)? {
			return Ok(right);
		}
		if right == zero && self.is_leaf(&left)? {
			return Ok(left);
		}
		Ok(self.store_internal(left, right))
	}

	fn is_leaf(&self, hash: &Bn254Fr) -> Result<bool, MerkleError> {
		Ok(matches!(self.node(hash)?, Node::Leaf { .. }))
	}
}

/// LSB-first path bits of a key, as the circom SMT templates consume them.
fn path_bits(key: &Bn254Fr) -> Vec<bool> {
	let mut bits = key.into_bigint().to_bits_le();
	bits.truncate(TREE_DEPTH);
	bits.resize(TREE_DEPTH, false);
	bits
}
