//! Builders for the 2-in-2-out transact circuit.
//!
//! Deposit, withdraw, and transfer all prove against the same circuit shape;
//! they differ in which slots are real and in the sign of `public_amount`:
//!
//! - deposit: `public_amount = amount` (value enters the pool)
//! - transfer: `public_amount = 0` (value stays shielded)
//! - withdraw: `public_amount = -amount` (field negation; value leaves)

use dp_merkle::incremental::{compute_root_from_path, MerklePath};
use dp_zk_core::crypto::field::address_to_field;
use dp_zk_core::models::note::compute_nullifier;
use dp_zk_core::{Bn254Fr, EthAddress, Note, NoteRecord, Nullifier, OwnerPubkey, SessionKeys};

use crate::error::InputError;
use crate::types::{InputSlot, TransactCircuitInputs};

/// Build deposit inputs for a freshly created note.
///
/// Both input slots are dummies: zero nullifiers, zero paths, and a zero
/// Merkle root the verifier ignores. Output slot 0 carries the note.
pub fn build_deposit(note: &Note) -> TransactCircuitInputs {
	let dummy = Note::dummy();
	TransactCircuitInputs {
		merkle_root: Bn254Fr::from(0u64),
		nullifiers: [Nullifier::zero(), Nullifier::zero()],
		out_commitments: [note.commitment(), dummy.commitment()],
		public_amount: Bn254Fr::from(note.amount),
		public_asset: note.asset,
		recipient: Bn254Fr::from(0u64),
		chain_id: note.chain_id,
		inputs: [InputSlot::dummy(), InputSlot::dummy()],
		outputs: [*note, dummy],
		spending_key: Bn254Fr::from(0u64).into(),
		nullifier_key: Bn254Fr::from(0u64).into(),
	}
}

/// Build withdraw inputs: spend `input`, release `amount` on-chain to
/// `recipient`, keep the remainder as a change note.
///
/// The attested `merkle_root` is recomputed from `(input.commitment, path)`,
/// so the proof binds to the specific historical root the caller's path was
/// generated against; the contract accepts it via its known-root history.
pub fn build_withdraw(
	input: &NoteRecord,
	amount: u128,
	recipient: &EthAddress,
	path: &MerklePath,
	keys: &SessionKeys,
) -> Result<TransactCircuitInputs, InputError> {
	if !input.is_confirmed() {
		return Err(InputError::UnconfirmedInput);
	}
	if amount > input.note.amount {
		return Err(InputError::AmountExceedsBalance {
			requested: amount,
			available: input.note.amount,
		});
	}

	let leaf_index = input.leaf_index as u64;
	let nullifier = compute_nullifier(&keys.nullifier_key, &input.commitment, leaf_index);

	// Change note mirrors the input owner; exact spends leave a dummy
	let change = if input.note.amount > amount {
		Note::new(
			input.note.owner,
			input.note.amount - amount,
			input.note.asset,
			input.note.chain_id,
		)
	} else {
		Note::dummy()
	};
	let dummy = Note::dummy();

	let merkle_root = compute_root_from_path(input.commitment.inner(), path);

	Ok(TransactCircuitInputs {
		merkle_root,
		nullifiers: [nullifier, Nullifier::zero()],
		out_commitments: [change.commitment(), dummy.commitment()],
		// Field negation: the additive inverse of `amount` mod the exact order
		public_amount: -Bn254Fr::from(amount),
		public_asset: input.note.asset,
		recipient: address_to_field(recipient),
		chain_id: input.note.chain_id,
		inputs: [
			InputSlot {
				note: input.note,
				leaf_index,
				nullifier,
				path: path.clone(),
			},
			InputSlot::dummy(),
		],
		outputs: [change, dummy],
		spending_key: keys.spending_key,
		nullifier_key: keys.nullifier_key,
	})
}

/// Build transfer inputs: spend `input`, pay `amount` to `recipient_owner`
/// inside the pool, keep the remainder as change.
pub fn build_transfer(
	input: &NoteRecord,
	recipient_owner: OwnerPubkey,
	amount: u128,
	path: &MerklePath,
	keys: &SessionKeys,
) -> Result<TransactCircuitInputs, InputError> {
	if !input.is_confirmed() {
		return Err(InputError::UnconfirmedInput);
	}
	if amount > input.note.amount {
		return Err(InputError::AmountExceedsBalance {
			requested: amount,
			available: input.note.amount,
		});
	}

	let leaf_index = input.leaf_index as u64;
	let nullifier = compute_nullifier(&keys.nullifier_key, &input.commitment, leaf_index);

	let recipient_note = Note::new(
		recipient_owner,
		amount,
		input.note.asset,
		input.note.chain_id,
	);
	let change = if input.note.amount > amount {
		Note::new(
			input.note.owner,
			input.note.amount - amount,
			input.note.asset,
			input.note.chain_id,
		)
	} else {
		Note::dummy()
	};

	let merkle_root = compute_root_from_path(input.commitment.inner(), path);

	Ok(TransactCircuitInputs {
		merkle_root,
		nullifiers: [nullifier, Nullifier::zero()],
		out_commitments: [recipient_note.commitment(), change.commitment()],
		public_amount: Bn254Fr::from(0u64),
		public_asset: input.note.asset,
		recipient: Bn254Fr::from(0u64),
		chain_id: input.note.chain_id,
		inputs: [
			InputSlot {
				note: input.note,
				leaf_index,
				nullifier,
				path: path.clone(),
			},
			InputSlot::dummy(),
		],
		outputs: [recipient_note, change],
		spending_key: keys.spending_key,
		nullifier_key: keys.nullifier_key,
	})
}
