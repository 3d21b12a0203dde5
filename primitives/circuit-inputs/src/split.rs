//! Builder for the 2-in-8-out split circuit.
//!
//! Splits one input note into up to eight output notes: the caller-supplied
//! chunks (optionally paid to another owner) plus an optional change note
//! back to the input owner. Remaining slots are dummies.

use dp_merkle::incremental::{compute_root_from_path, MerklePath};
use dp_zk_core::models::note::compute_nullifier;
use dp_zk_core::{Bn254Fr, Note, NoteRecord, Nullifier, OwnerPubkey, SessionKeys};

use crate::error::InputError;
use crate::types::{InputSlot, SplitCircuitInputs, SPLIT_OUTPUTS};

/// Build split inputs.
///
/// Validates that the chunk sum fits the input balance and that the chunks
/// plus any change note fit the eight output slots.
pub fn build_split(
	input: &NoteRecord,
	chunks: &[u128],
	recipient_owner: Option<OwnerPubkey>,
	path: &MerklePath,
	keys: &SessionKeys,
) -> Result<SplitCircuitInputs, InputError> {
	if !input.is_confirmed() {
		return Err(InputError::UnconfirmedInput);
	}
	if chunks.is_empty() {
		return Err(InputError::InvalidChunkSum("no chunks supplied".to_string()));
	}

	let mut sum: u128 = 0;
	for chunk in chunks {
		if *chunk == 0 {
			return Err(InputError::InvalidChunkSum("zero-value chunk".to_string()));
		}
		sum = sum.checked_add(*chunk).ok_or(InputError::FieldOverflow)?;
	}
	if sum > input.note.amount {
		return Err(InputError::InvalidChunkSum(format!(
			"chunk sum {sum} exceeds input amount {}",
			input.note.amount
		)));
	}

	let needs_change = sum < input.note.amount;
	let used_slots = chunks.len() + usize::from(needs_change);
	if used_slots > SPLIT_OUTPUTS {
		return Err(InputError::TooManyChunks {
			chunks: used_slots,
			max: SPLIT_OUTPUTS,
		});
	}

	let chunk_owner = recipient_owner.unwrap_or(input.note.owner);
	let mut outputs: Vec<Note> = chunks
		.iter()
		.map(|amount| Note::new(chunk_owner, *amount, input.note.asset, input.note.chain_id))
		.collect();
	if needs_change {
		outputs.push(Note::new(
			input.note.owner,
			input.note.amount - sum,
			input.note.asset,
			input.note.chain_id,
		));
	}
	outputs.resize(SPLIT_OUTPUTS, Note::dummy());
	let outputs: [Note; SPLIT_OUTPUTS] = outputs
		.try_into()
		.expect("resized to the fixed slot count");

	let leaf_index = input.leaf_index as u64;
	let nullifier = compute_nullifier(&keys.nullifier_key, &input.commitment, leaf_index);
	let out_commitments = outputs.map(|note| note.commitment());

	Ok(SplitCircuitInputs {
		merkle_root: compute_root_from_path(input.commitment.inner(), path),
		nullifiers: [nullifier, Nullifier::zero()],
		out_commitments,
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
		outputs,
		spending_key: keys.spending_key,
		nullifier_key: keys.nullifier_key,
	})
}
