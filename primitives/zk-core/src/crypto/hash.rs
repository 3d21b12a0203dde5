//! # Poseidon Hash Function
//!
//! Poseidon is a ZK-friendly hash function optimized for use inside
//! ZK-SNARK circuits (~300 constraints vs ~25,000 for SHA-256).
//!
//! This implementation uses `light-poseidon`, which is **compatible with
//! circomlib/iden3**, ensuring that hashes computed here match those from
//! the circom circuits and the on-chain pool contract.
//!
//! ## Fixed arities
//!
//! The protocol uses five fixed arities:
//! - `Poseidon₁(spending_key)`: owner public key
//! - `Poseidon₂(left, right)`: Merkle node hashing, asset identifiers
//! - `Poseidon₃(nullifier_key, commitment, leaf_index)`: nullifiers,
//!   SMT leaf hashes
//! - `Poseidon₅(owner, amount, asset, chain_id, blinding)`: note
//!   commitments
//! - `Poseidon₆`: reserved for extended commitment forms
//!
//! ## References
//!
//! - Poseidon paper: https://eprint.iacr.org/2019/458.pdf
//! - circomlib: https://github.com/iden3/circomlib
//! - light-poseidon: https://github.com/Lightprotocol/light-poseidon

use crate::core::error::CoreError;
use crate::core::types::Bn254Fr;

pub use light_poseidon::Poseidon;
use light_poseidon::PoseidonHasher;

/// Maximum Poseidon arity used anywhere in the protocol
pub const MAX_POSEIDON_INPUTS: usize = 6;

/// Poseidon hash for 1 input (circomlib `Poseidon(1)`)
///
/// Used for owner public keys: `owner = Poseidon₁(spending_key)`.
pub fn poseidon_hash_1(inputs: &[Bn254Fr; 1]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(1).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 1 input")
}

/// Poseidon hash for 2 inputs (circomlib `Poseidon(2)`)
///
/// This is the standard hash used for:
/// - Merkle tree sibling hashing
/// - Asset identifiers: `Poseidon₂(chain_id, token_address)`
pub fn poseidon_hash_2(inputs: &[Bn254Fr; 2]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(2).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 2 inputs")
}

/// Poseidon hash for 3 inputs (circomlib `Poseidon(3)`)
///
/// Used for nullifiers, `Poseidon₃(nullifier_key, commitment, leaf_index)`,
/// and for SMT leaf hashes `Poseidon₃(key, value, 1)`.
pub fn poseidon_hash_3(inputs: &[Bn254Fr; 3]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(3).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 3 inputs")
}

/// Poseidon hash for 4 inputs (circomlib `Poseidon(4)`)
pub fn poseidon_hash_4(inputs: &[Bn254Fr; 4]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(4).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 4 inputs")
}

/// Poseidon hash for 5 inputs (circomlib `Poseidon(5)`)
///
/// This is the note commitment hash:
/// `commitment = Poseidon₅(owner, amount, asset, chain_id, blinding)`
pub fn poseidon_hash_5(inputs: &[Bn254Fr; 5]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(5).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 5 inputs")
}

/// Poseidon hash for 6 inputs (circomlib `Poseidon(6)`)
pub fn poseidon_hash_6(inputs: &[Bn254Fr; 6]) -> Bn254Fr {
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(6).expect("Could not create Poseidon hasher");
	hasher
		.hash(inputs)
		.expect("Poseidon hash failed for 6 inputs")
}

/// Generic Poseidon hash for 1-6 inputs
///
/// Prefer the fixed-arity functions; this exists for callers that assemble
/// input slices dynamically.
pub fn poseidon_hash(inputs: &[Bn254Fr]) -> Result<Bn254Fr, CoreError> {
	if inputs.is_empty() || inputs.len() > MAX_POSEIDON_INPUTS {
		return Err(CoreError::CryptoFailure(format!(
			"Poseidon supports 1-{MAX_POSEIDON_INPUTS} inputs, got {}",
			inputs.len()
		)));
	}
	let mut hasher = Poseidon::<Bn254Fr>::new_circom(inputs.len())
		.map_err(|e| CoreError::CryptoFailure(format!("Poseidon init failed: {e}")))?;
	hasher
		.hash(inputs)
		.map_err(|e| CoreError::CryptoFailure(format!("Poseidon hash failed: {e}")))
}
