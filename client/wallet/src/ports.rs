//! Collaborator ports.
//!
//! The core never talks HTTP, JSON-RPC, or storage engines directly; it
//! consumes these traits. Adapters (the HTTP relayer client, the chain RPC
//! client, the browser store, the native prover) implement them outside this
//! crate, and tests swap in mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dp_circuit_inputs::CircuitId;
use dp_merkle::incremental::MerklePath;
use dp_merkle::{ExclusionWitness, TREE_DEPTH};
use dp_zk_core::crypto::field::fr_from_dec;
use dp_zk_core::{Bn254Fr, ChainId, Commitment, EthAddress, NoteRecord, Nullifier};

use crate::error::WalletError;

// ============================================================================
// DTOs
// ============================================================================

/// A generated proof plus its public signals (decimal strings).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofArtifact {
	pub proof: Vec<u8>,
	pub public_signals: Vec<String>,
}

/// Relayer receipt for a withdrawal-shaped submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
	pub tx_hash: String,
	pub block_number: u64,
	pub gas_used: u64,
	pub fee: String,
}

/// Relayer receipt for an internal transfer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
	pub success: bool,
	pub tx_hash: String,
}

/// Outcome of a batched submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
	pub results: Vec<WithdrawalReceipt>,
	pub errors: Vec<String>,
	pub total: usize,
	pub succeeded: usize,
}

/// Deposit confirmation state as seen by the relayer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatus {
	pub confirmed: bool,
	pub leaf_index: Option<u64>,
}

/// Relayer receipt for a compliance-proof submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReceipt {
	pub tx_hash: String,
	pub verified: bool,
}

/// SMT non-membership witness on the wire: all decimal strings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceWitnessResponse {
	pub exclusion_root: String,
	pub smt_siblings: Vec<String>,
	pub smt_old_key: String,
	pub smt_old_value: String,
	pub smt_is_old0: String,
}

impl ComplianceWitnessResponse {
	/// Decode the wire form into a typed witness.
	pub fn to_witness(&self) -> Result<ExclusionWitness, WalletError> {
		if self.smt_siblings.len() != TREE_DEPTH {
			return Err(WalletError::RelayerRejected(format!(
				"witness carries {} siblings, expected {TREE_DEPTH}",
				self.smt_siblings.len()
			)));
		}
		let mut siblings = [Bn254Fr::from(0u64); TREE_DEPTH];
		for (slot, sibling) in self.smt_siblings.iter().enumerate() {
			siblings[slot] = fr_from_dec(sibling)?;
		}
		Ok(ExclusionWitness {
			exclusion_root: fr_from_dec(&self.exclusion_root)?,
			siblings,
			old_key: fr_from_dec(&self.smt_old_key)?,
			old_value: fr_from_dec(&self.smt_old_value)?,
			is_old0: self.smt_is_old0 != "0",
		})
	}
}

// ============================================================================
// Ports
// ============================================================================

/// Persisted wallet notes. Single writer per wallet address; the
/// mark-spent-and-save operation is one atomic transaction.
#[async_trait]
pub trait NoteStore: Send + Sync {
	async fn save_pending(&self, wallet: &str, note: &NoteRecord) -> Result<(), WalletError>;

	/// Atomically mark `input_id` spent and persist `outputs`.
	///
	/// Implementations MUST apply both effects or neither; a refused write
	/// surfaces as `StoreRejected` and the spend is retried from the top.
	async fn mark_spent_and_save_outputs(
		&self,
		wallet: &str,
		input_id: &str,
		outputs: &[NoteRecord],
	) -> Result<(), WalletError>;

	async fn unspent_notes(
		&self,
		wallet: &str,
		chain_id: ChainId,
	) -> Result<Vec<NoteRecord>, WalletError>;

	async fn update_leaf_index(&self, id: &str, leaf_index: u64) -> Result<(), WalletError>;

	async fn delete_all(&self, wallet: &str) -> Result<(), WalletError>;
}

/// The relayer's proof-assembly and submission surface.
#[async_trait]
pub trait RelayerClient: Send + Sync {
	async fn tree_root(&self, chain_id: ChainId) -> Result<Bn254Fr, WalletError>;

	async fn merkle_proof(
		&self,
		leaf_index: u64,
		chain_id: ChainId,
	) -> Result<MerklePath, WalletError>;

	async fn submit_withdrawal(
		&self,
		proof: &ProofArtifact,
		chain_id: ChainId,
		token: &str,
	) -> Result<WithdrawalReceipt, WalletError>;

	async fn submit_split_withdrawal(
		&self,
		proof: &ProofArtifact,
		chain_id: ChainId,
		token: &str,
	) -> Result<WithdrawalReceipt, WalletError>;

	async fn submit_transfer(
		&self,
		proof: &ProofArtifact,
		chain_id: ChainId,
	) -> Result<TransferReceipt, WalletError>;

	async fn submit_batch_withdrawal(
		&self,
		proofs: &[ProofArtifact],
		chain_id: ChainId,
	) -> Result<BatchOutcome, WalletError>;

	async fn submit_batch_swap(
		&self,
		proofs: &[ProofArtifact],
		chain_id: ChainId,
	) -> Result<BatchOutcome, WalletError>;

	async fn deposit_status(
		&self,
		commitment: &Commitment,
		chain_id: ChainId,
	) -> Result<DepositStatus, WalletError>;

	async fn compliance_witness(
		&self,
		commitment: &Commitment,
		chain_id: ChainId,
	) -> Result<ComplianceWitnessResponse, WalletError>;

	async fn submit_compliance_proof(
		&self,
		proof: &ProofArtifact,
		exclusion_root: &Bn254Fr,
		nullifier: &Nullifier,
		chain_id: ChainId,
	) -> Result<ComplianceReceipt, WalletError>;
}

/// Minimal on-chain reads the compliance gate needs.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// The pool's live compliance-verifier address; `None` when unset/zero.
	async fn compliance_verifier(
		&self,
		chain_id: ChainId,
	) -> Result<Option<EthAddress>, WalletError>;

	/// Whether `complianceVerified[nullifier]` is already true on-chain.
	async fn is_compliance_verified(
		&self,
		nullifier: &Nullifier,
		chain_id: ChainId,
	) -> Result<bool, WalletError>;
}

/// The proving system behind a tagged interface: the FFLONK wrapper in
/// production, a mock in tests.
#[async_trait]
pub trait ProofBackend: Send + Sync {
	async fn prove(
		&self,
		circuit: CircuitId,
		inputs: &serde_json::Value,
	) -> Result<ProofArtifact, WalletError>;

	async fn verify(
		&self,
		circuit: CircuitId,
		artifact: &ProofArtifact,
	) -> Result<bool, WalletError>;
}
