//! Typed circuit inputs and their prover-JSON serialization.
//!
//! Every struct carries both the public signals (exposed in circuit order
//! through `public_signals()`) and the private witness. `to_prover_inputs()`
//! renders the whole assignment as the decimal-string JSON document the
//! FFLONK prover consumes.

use serde_json::{json, Value};

use dp_merkle::incremental::MerklePath;
use dp_merkle::TREE_DEPTH;
use dp_zk_core::crypto::field::fr_to_dec;
use dp_zk_core::{
	AssetId, Bn254Fr, ChainId, Commitment, MerkleRoot, Note, NullifierKey, Nullifier, SpendingKey,
};

/// Output slots in the split circuit
pub const SPLIT_OUTPUTS: usize = 8;

/// Input slots in every spend circuit
pub const TX_INPUTS: usize = 2;

/// Output slots in the 2-in-2-out circuit
pub const TX_OUTPUTS: usize = 2;

/// The circuits the pool proves against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CircuitId {
	Deposit,
	Transact,
	Split,
	Compliance,
}

impl CircuitId {
	/// Artifact name used by the proof backend
	pub fn as_str(&self) -> &'static str {
		match self {
			CircuitId::Deposit => "deposit",
			CircuitId::Transact => "transact",
			CircuitId::Split => "split",
			CircuitId::Compliance => "compliance",
		}
	}

	/// Number of public signals that follow the proof in the calldata
	pub fn public_signal_count(&self) -> usize {
		match self {
			CircuitId::Deposit | CircuitId::Transact => 9,
			CircuitId::Split => 15,
			CircuitId::Compliance => 2,
		}
	}
}

/// One input slot: the consumed note with its position and authentication
/// path. Dummy slots carry a zero nullifier and the zero path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSlot {
	pub note: Note,
	pub leaf_index: u64,
	pub nullifier: Nullifier,
	pub path: MerklePath,
}

impl InputSlot {
	/// The padding slot for unused circuit inputs.
	pub fn dummy() -> Self {
		Self {
			note: Note::dummy(),
			leaf_index: 0,
			nullifier: Nullifier::zero(),
			path: MerklePath::zero(),
		}
	}
}

/// Inputs for the 2-in-2-out transact circuit (deposit, withdraw, transfer).
#[derive(Clone, Debug)]
pub struct TransactCircuitInputs {
	// Public signals
	pub merkle_root: MerkleRoot,
	pub nullifiers: [Nullifier; TX_INPUTS],
	pub out_commitments: [Commitment; TX_OUTPUTS],
	pub public_amount: Bn254Fr,
	pub public_asset: AssetId,
	pub recipient: Bn254Fr,
	pub chain_id: ChainId,

	// Private witness
	pub inputs: [InputSlot; TX_INPUTS],
	pub outputs: [Note; TX_OUTPUTS],
	pub spending_key: SpendingKey,
	pub nullifier_key: NullifierKey,
}

impl TransactCircuitInputs {
	/// Public signals in circuit order (9 elements).
	pub fn public_signals(&self) -> Vec<Bn254Fr> {
		vec![
			self.merkle_root,
			self.nullifiers[0].inner(),
			self.nullifiers[1].inner(),
			self.out_commitments[0].inner(),
			self.out_commitments[1].inner(),
			self.public_amount,
			self.public_asset,
			self.recipient,
			Bn254Fr::from(self.chain_id),
		]
	}

	/// Full witness assignment as prover JSON.
	pub fn to_prover_inputs(&self) -> Value {
		json!({
			"merkleRoot": fr_to_dec(&self.merkle_root),
			"inNullifier": dec_vec(self.nullifiers.iter().map(|n| n.inner())),
			"outCommitment": dec_vec(self.out_commitments.iter().map(|c| c.inner())),
			"publicAmount": fr_to_dec(&self.public_amount),
			"publicAsset": fr_to_dec(&self.public_asset),
			"recipient": fr_to_dec(&self.recipient),
			"chainId": self.chain_id.to_string(),
			"inAmount": self.inputs.iter().map(|i| i.note.amount.to_string()).collect::<Vec<_>>(),
			"inBlinding": dec_vec(self.inputs.iter().map(|i| i.note.blinding)),
			"inLeafIndex": self.inputs.iter().map(|i| i.leaf_index.to_string()).collect::<Vec<_>>(),
			"inPathElements": self.inputs.iter().map(|i| path_elements(&i.path)).collect::<Vec<_>>(),
			"inPathIndices": self.inputs.iter().map(|i| path_indices(&i.path)).collect::<Vec<_>>(),
			"outOwner": dec_vec(self.outputs.iter().map(|o| o.owner)),
			"outAmount": self.outputs.iter().map(|o| o.amount.to_string()).collect::<Vec<_>>(),
			"outBlinding": dec_vec(self.outputs.iter().map(|o| o.blinding)),
			"spendingKey": fr_to_dec(&self.spending_key.inner()),
			"nullifierKey": fr_to_dec(&self.nullifier_key.inner()),
		})
	}
}

/// Inputs for the 2-in-8-out split circuit.
#[derive(Clone, Debug)]
pub struct SplitCircuitInputs {
	// Public signals
	pub merkle_root: MerkleRoot,
	pub nullifiers: [Nullifier; TX_INPUTS],
	pub out_commitments: [Commitment; SPLIT_OUTPUTS],
	pub public_amount: Bn254Fr,
	pub public_asset: AssetId,
	pub recipient: Bn254Fr,
	pub chain_id: ChainId,

	// Private witness
	pub inputs: [InputSlot; TX_INPUTS],
	pub outputs: [Note; SPLIT_OUTPUTS],
	pub spending_key: SpendingKey,
	pub nullifier_key: NullifierKey,
}

impl SplitCircuitInputs {
	/// Public signals in circuit order (15 elements).
	pub fn public_signals(&self) -> Vec<Bn254Fr> {
		let mut signals = vec![
			self.merkle_root,
			self.nullifiers[0].inner(),
			self.nullifiers[1].inner(),
		];
		signals.extend(self.out_commitments.iter().map(|c| c.inner()));
		signals.push(self.public_amount);
		signals.push(self.public_asset);
		signals.push(self.recipient);
		signals.push(Bn254Fr::from(self.chain_id));
		signals
	}

	/// Full witness assignment as prover JSON.
	pub fn to_prover_inputs(&self) -> Value {
		json!({
			"merkleRoot": fr_to_dec(&self.merkle_root),
			"inNullifier": dec_vec(self.nullifiers.iter().map(|n| n.inner())),
			"outCommitment": dec_vec(self.out_commitments.iter().map(|c| c.inner())),
			"publicAmount": fr_to_dec(&self.public_amount),
			"publicAsset": fr_to_dec(&self.public_asset),
			"recipient": fr_to_dec(&self.recipient),
			"chainId": self.chain_id.to_string(),
			"inAmount": self.inputs.iter().map(|i| i.note.amount.to_string()).collect::<Vec<_>>(),
			"inBlinding": dec_vec(self.inputs.iter().map(|i| i.note.blinding)),
			"inLeafIndex": self.inputs.iter().map(|i| i.leaf_index.to_string()).collect::<Vec<_>>(),
			"inPathElements": self.inputs.iter().map(|i| path_elements(&i.path)).collect::<Vec<_>>(),
			"inPathIndices": self.inputs.iter().map(|i| path_indices(&i.path)).collect::<Vec<_>>(),
			"outOwner": dec_vec(self.outputs.iter().map(|o| o.owner)),
			"outAmount": self.outputs.iter().map(|o| o.amount.to_string()).collect::<Vec<_>>(),
			"outBlinding": dec_vec(self.outputs.iter().map(|o| o.blinding)),
			"spendingKey": fr_to_dec(&self.spending_key.inner()),
			"nullifierKey": fr_to_dec(&self.nullifier_key.inner()),
		})
	}
}

/// Inputs for the compliance (SMT non-membership) circuit.
#[derive(Clone, Debug)]
pub struct ComplianceCircuitInputs {
	// Public signals
	pub exclusion_root: MerkleRoot,
	pub nullifier: Nullifier,

	// Private witness
	pub commitment: Commitment,
	pub nullifier_key: NullifierKey,
	pub leaf_index: u64,
	pub smt_siblings: [Bn254Fr; TREE_DEPTH],
	pub smt_old_key: Bn254Fr,
	pub smt_old_value: Bn254Fr,
	pub smt_is_old0: bool,
}

impl ComplianceCircuitInputs {
	/// Public signals in circuit order (exactly two).
	pub fn public_signals(&self) -> Vec<Bn254Fr> {
		vec![self.exclusion_root, self.nullifier.inner()]
	}

	/// Full witness assignment as prover JSON.
	pub fn to_prover_inputs(&self) -> Value {
		let is_old0 = if self.smt_is_old0 { "1" } else { "0" };
		json!({
			"exclusionRoot": fr_to_dec(&self.exclusion_root),
			"nullifier": fr_to_dec(&self.nullifier.inner()),
			"commitment": fr_to_dec(&self.commitment.inner()),
			"nullifierKey": fr_to_dec(&self.nullifier_key.inner()),
			"leafIndex": self.leaf_index.to_string(),
			"smtSiblings": dec_vec(self.smt_siblings.iter().copied()),
			"smtOldKey": fr_to_dec(&self.smt_old_key),
			"smtOldValue": fr_to_dec(&self.smt_old_value),
			"smtIsOld0": is_old0,
		})
	}
}

fn dec_vec(values: impl Iterator<Item = Bn254Fr>) -> Vec<String> {
	values.map(|v| fr_to_dec(&v)).collect()
}

fn path_elements(path: &MerklePath) -> Vec<String> {
	path.path_elements.iter().map(fr_to_dec).collect()
}

fn path_indices(path: &MerklePath) -> Vec<String> {
	path.path_indices.iter().map(|i| i.to_string()).collect()
}
