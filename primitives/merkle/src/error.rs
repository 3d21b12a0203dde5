//! Error types for the Merkle subsystems.

use thiserror::Error;

/// Errors that can occur in Merkle tree and SMT operations
#[derive(Debug, Error)]
pub enum MerkleError {
	/// Requested proof for a leaf that is not in the tree
	#[error("leaf index {index} out of range (tree has {count} leaves)")]
	LeafIndexOutOfRange { index: u64, count: u64 },

	/// The deposit tree reached its 2^20 capacity
	#[error("merkle tree is full")]
	TreeFull,

	/// Non-membership witness requested for a flagged commitment
	#[error("commitment is in the exclusion set; cannot prove exclusion")]
	CannotProveExclusion,

	/// The SMT node map no longer describes a consistent tree
	#[error("sparse merkle tree corruption: {0}")]
	SmtCorruption(String),

	/// Checkpoint persistence failure
	#[error("checkpoint error: {0}")]
	Checkpoint(String),
}
