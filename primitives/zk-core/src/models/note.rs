//! # Note Structure
//!
//! A note represents a private value in the shielded pool.
//!
//! ## Structure
//!
//! ```text
//! Note {
//!     owner: Fr        // Owner public key = Poseidon₁(spending_key)
//!     amount: u128     // Token amount in wei (hidden)
//!     asset: Fr        // Asset id = Poseidon₂(chain_id, token) (hidden)
//!     chain_id: u64    // Chain the note lives on
//!     blinding: Fr     // 248-bit random factor (prevents correlation)
//! }
//! ```
//!
//! ## Commitment
//!
//! A note's commitment is stored in the deposit Merkle tree:
//! ```text
//! commitment = Poseidon₅(owner, amount, asset, chain_id, blinding)
//! ```
//!
//! ## Nullifier
//!
//! When spending a note, a nullifier is published to prevent
//! double-spending:
//! ```text
//! nullifier = Poseidon₃(nullifier_key, commitment, leaf_index)
//! ```
//!
//! Dummy input slots carry a zero nullifier regardless of what the formula
//! would compute.

use crate::core::types::{
	AssetId, Blinding, Bn254Fr, ChainId, Commitment, EthAddress, NullifierKey, Nullifier,
	OwnerPubkey,
};
use crate::crypto::field::{address_to_field, rand_field_248bit, to_bytes32_hex};
use crate::crypto::hash::{poseidon_hash_2, poseidon_hash_3, poseidon_hash_5};

// ============================================================================
// Note
// ============================================================================

/// A private note in the shielded pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
	/// Owner public key
	pub owner: OwnerPubkey,
	/// Token amount in the smallest unit (wei)
	pub amount: u128,
	/// Asset identifier
	pub asset: AssetId,
	/// Chain the note belongs to
	pub chain_id: ChainId,
	/// Random blinding factor
	pub blinding: Blinding,
}

impl Note {
	/// Create a new note with a freshly sampled blinding factor.
	pub fn new(owner: OwnerPubkey, amount: u128, asset: AssetId, chain_id: ChainId) -> Self {
		Self {
			owner,
			amount,
			asset,
			chain_id,
			blinding: rand_field_248bit(),
		}
	}

	/// Create a note with an explicit blinding factor.
	pub fn with_blinding(
		owner: OwnerPubkey,
		amount: u128,
		asset: AssetId,
		chain_id: ChainId,
		blinding: Blinding,
	) -> Self {
		Self {
			owner,
			amount,
			asset,
			chain_id,
			blinding,
		}
	}

	/// The all-zero dummy note used to pad unused circuit slots.
	///
	/// Its commitment is a fixed constant; its nullifier MUST be zero in
	/// circuit inputs.
	pub fn dummy() -> Self {
		Self {
			owner: Bn254Fr::from(0u64),
			amount: 0,
			asset: Bn254Fr::from(0u64),
			chain_id: 0,
			blinding: Bn254Fr::from(0u64),
		}
	}

	/// Whether every field is zero.
	pub fn is_dummy(&self) -> bool {
		self.owner == Bn254Fr::from(0u64)
			&& self.amount == 0
			&& self.asset == Bn254Fr::from(0u64)
			&& self.chain_id == 0
			&& self.blinding == Bn254Fr::from(0u64)
	}

	/// Compute the commitment for this note.
	pub fn commitment(&self) -> Commitment {
		Commitment::new(poseidon_hash_5(&[
			self.owner,
			Bn254Fr::from(self.amount),
			self.asset,
			Bn254Fr::from(self.chain_id),
			self.blinding,
		]))
	}
}

/// Compute the nullifier for a confirmed note.
///
/// Callers MUST substitute a zero nullifier for dummy slots instead of
/// calling this.
pub fn compute_nullifier(
	nullifier_key: &NullifierKey,
	commitment: &Commitment,
	leaf_index: u64,
) -> Nullifier {
	Nullifier::new(poseidon_hash_3(&[
		nullifier_key.inner(),
		commitment.inner(),
		Bn254Fr::from(leaf_index),
	]))
}

/// Deterministic asset identifier: `Poseidon₂(chain_id, token_address)`.
pub fn asset_id(chain_id: ChainId, token: &EthAddress) -> AssetId {
	poseidon_hash_2(&[Bn254Fr::from(chain_id), address_to_field(token)])
}

// ============================================================================
// NoteRecord
// ============================================================================

/// Compliance screening state of a tracked note
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplianceStatus {
	/// No compliance proof has been accepted for this note yet
	Unverified,
	/// A compliance proof was accepted on-chain
	Verified,
	/// Created by a spend whose inputs were already verified
	Inherited,
}

/// A note as tracked by the wallet store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteRecord {
	pub note: Note,
	pub commitment: Commitment,
	/// Position in the deposit tree; -1 while unconfirmed
	pub leaf_index: i64,
	pub spent: bool,
	/// Creation time, milliseconds since the epoch
	pub created_at_ms: u64,
	/// Block the deposit was confirmed in, when known
	pub block_number: Option<u64>,
	pub compliance: ComplianceStatus,
}

impl NoteRecord {
	/// Wrap a freshly created note that is not yet confirmed in the tree.
	pub fn pending(note: Note, created_at_ms: u64) -> Self {
		Self {
			commitment: note.commitment(),
			note,
			leaf_index: -1,
			spent: false,
			created_at_ms,
			block_number: None,
			compliance: ComplianceStatus::Unverified,
		}
	}

	/// Store identifier: the commitment hex.
	pub fn id(&self) -> String {
		to_bytes32_hex(&self.commitment.inner())
	}

	/// Whether the note has a confirmed position in the deposit tree.
	pub fn is_confirmed(&self) -> bool {
		self.leaf_index >= 0
	}

	/// Nullifier for this record.
	///
	/// Returns the zero nullifier for dummy notes and `None` for notes that
	/// have no confirmed leaf index yet.
	pub fn nullifier(&self, nullifier_key: &NullifierKey) -> Option<Nullifier> {
		if self.note.is_dummy() {
			return Some(Nullifier::zero());
		}
		if !self.is_confirmed() {
			return None;
		}
		Some(compute_nullifier(
			nullifier_key,
			&self.commitment,
			self.leaf_index as u64,
		))
	}
}
