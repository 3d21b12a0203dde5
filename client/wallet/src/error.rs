//! The wallet-layer error taxonomy.
//!
//! Every failure a spend can hit maps to exactly one variant; foreign error
//! types never cross this boundary unmapped. Only [`WalletError::is_transient`]
//! failures are retried, and only with the bounded backoff in [`crate::retry`].

use thiserror::Error;

use dp_circuit_inputs::InputError;
use dp_merkle::MerkleError;
use dp_zk_core::CoreError;

/// Errors surfaced by the wallet orchestration layer
#[derive(Debug, Error)]
pub enum WalletError {
	/// Field codec / key derivation / cipher failure
	#[error(transparent)]
	Core(#[from] CoreError),

	/// Merkle tree or exclusion-set failure
	#[error(transparent)]
	Merkle(#[from] MerkleError),

	/// Circuit-input pre-validation failure
	#[error(transparent)]
	Input(#[from] InputError),

	/// Relayer 5xx or connection failure; retried with backoff
	#[error("relayer transient failure: {0}")]
	RelayerTransient(String),

	/// Relayer 4xx: blocked address, spent nullifier, malformed proof
	#[error("relayer rejected request: {0}")]
	RelayerRejected(String),

	/// Chain RPC unreachable; retried with backoff
	#[error("rpc unavailable: {0}")]
	RpcUnavailable(String),

	/// The input note's nullifier is already recorded on-chain
	#[error("nullifier already spent")]
	NullifierAlreadySpent,

	/// The deposit transaction reverted on-chain
	#[error("deposit reverted: {0}")]
	DepositReverted(String),

	/// Confirmation polling exhausted its attempts
	#[error("confirmation timed out: {0}")]
	ConfirmationTimeout(String),

	/// A locally generated proof failed local verification
	#[error("proof failed local verification: {0}")]
	ProofRejected(String),

	/// The note store refused the atomic spend write
	#[error("note store rejected write: {0}")]
	StoreRejected(String),

	/// The user or operator cancelled the operation
	#[error("operation cancelled")]
	Cancelled,
}

impl WalletError {
	/// Whether bounded retry is appropriate for this failure.
	pub fn is_transient(&self) -> bool {
		matches!(
			self,
			WalletError::RelayerTransient(_) | WalletError::RpcUnavailable(_)
		)
	}
}
