//! Integration tests for the note model

use dp_zk_core::crypto::hash::{poseidon_hash_3, poseidon_hash_5};
use dp_zk_core::models::note::{asset_id, compute_nullifier};
use dp_zk_core::{Bn254Fr, Note, NoteRecord, NullifierKey};

const ONE_ETH: u128 = 1_000_000_000_000_000_000;

#[test]
fn test_commitment_and_nullifier_scenario() {
	// owner 0x111, 1 ETH, native asset, Sepolia, blinding 0x999
	let note = Note::with_blinding(
		Bn254Fr::from(0x111u64),
		ONE_ETH,
		Bn254Fr::from(0u64),
		11155111,
		Bn254Fr::from(0x999u64),
	);

	let commitment = note.commitment();
	assert_eq!(
		commitment.inner(),
		poseidon_hash_5(&[
			Bn254Fr::from(0x111u64),
			Bn254Fr::from(ONE_ETH),
			Bn254Fr::from(0u64),
			Bn254Fr::from(11155111u64),
			Bn254Fr::from(0x999u64),
		])
	);

	let key = NullifierKey::new(Bn254Fr::from(0x5678u64));
	let nullifier = compute_nullifier(&key, &commitment, 5);
	assert_eq!(
		nullifier.inner(),
		poseidon_hash_3(&[
			Bn254Fr::from(0x5678u64),
			commitment.inner(),
			Bn254Fr::from(5u64),
		])
	);
}

#[test]
fn test_same_note_same_commitment() {
	let note = Note::with_blinding(
		Bn254Fr::from(7u64),
		42,
		Bn254Fr::from(3u64),
		1,
		Bn254Fr::from(9u64),
	);
	assert_eq!(note.commitment(), note.commitment());

	let twin = note;
	assert_eq!(note.commitment(), twin.commitment());
}

#[test]
fn test_blinding_separates_identical_notes() {
	let a = Note::with_blinding(Bn254Fr::from(7u64), 42, Bn254Fr::from(3u64), 1, Bn254Fr::from(1u64));
	let b = Note::with_blinding(Bn254Fr::from(7u64), 42, Bn254Fr::from(3u64), 1, Bn254Fr::from(2u64));
	assert_ne!(a.commitment(), b.commitment());
}

#[test]
fn test_double_spend_produces_identical_nullifier() {
	// Two spend attempts of the same confirmed note must emit the same
	// nullifier, which is what lets the chain reject the second
	let key = NullifierKey::new(Bn254Fr::from(0xabcu64));
	let mut record = NoteRecord::pending(
		Note::new(Bn254Fr::from(5u64), 100, Bn254Fr::from(0u64), 1),
		1_700_000_000_000,
	);
	record.leaf_index = 12;

	let first = record.nullifier(&key).unwrap();
	let second = record.nullifier(&key).unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_leaf_index_is_part_of_nullifier() {
	let key = NullifierKey::new(Bn254Fr::from(0xabcu64));
	let note = Note::new(Bn254Fr::from(5u64), 100, Bn254Fr::from(0u64), 1);
	let commitment = note.commitment();

	assert_ne!(
		compute_nullifier(&key, &commitment, 0),
		compute_nullifier(&key, &commitment, 1)
	);
}

#[test]
fn test_asset_id_binds_chain_and_token() {
	let weth = [0x11u8; 20];
	let usdc = [0x22u8; 20];
	assert_ne!(asset_id(1, &weth), asset_id(1, &usdc));
	assert_ne!(asset_id(1, &weth), asset_id(10, &weth));
}
