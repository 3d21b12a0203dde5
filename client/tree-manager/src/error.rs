//! Error types for the tree manager.

use thiserror::Error;

use dp_merkle::MerkleError;

/// Failures while mirroring a chain's deposit tree
#[derive(Debug, Error)]
pub enum TreeManagerError {
	/// The event stream skipped a queue index; the mirror refuses to guess
	#[error("deposit queue gap: expected index {expected}, got {found}")]
	EventGapDetected { expected: u64, found: u64 },

	/// Chain RPC unreachable
	#[error("rpc unavailable: {0}")]
	RpcUnavailable(String),

	/// The root-update transaction reverted
	#[error("updateRoot reverted: {0}")]
	PostRootReverted(String),

	/// Local tree failure
	#[error(transparent)]
	Merkle(#[from] MerkleError),

	/// No manager registered for the requested chain
	#[error("chain {0} is not registered")]
	UnknownChain(u64),
}
