//! Builder for the compliance (exclusion-set non-membership) circuit.
//!
//! The circuit takes exactly two public signals (the exclusion root and the
//! input's nullifier) and privately re-derives the nullifier while checking
//! SMT non-membership of the commitment.

use dp_merkle::ExclusionWitness;
use dp_zk_core::models::note::compute_nullifier;
use dp_zk_core::{NoteRecord, NullifierKey};

use crate::error::InputError;
use crate::types::ComplianceCircuitInputs;

/// Assemble compliance inputs for one confirmed input note.
pub fn build_compliance(
	record: &NoteRecord,
	nullifier_key: &NullifierKey,
	witness: &ExclusionWitness,
) -> Result<ComplianceCircuitInputs, InputError> {
	if !record.is_confirmed() {
		return Err(InputError::UnconfirmedInput);
	}

	let leaf_index = record.leaf_index as u64;
	let nullifier = compute_nullifier(nullifier_key, &record.commitment, leaf_index);

	Ok(ComplianceCircuitInputs {
		exclusion_root: witness.exclusion_root,
		nullifier,
		commitment: record.commitment,
		nullifier_key: *nullifier_key,
		leaf_index,
		smt_siblings: witness.siblings,
		smt_old_key: witness.old_key,
		smt_old_value: witness.old_value,
		smt_is_old0: witness.is_old0,
	})
}
