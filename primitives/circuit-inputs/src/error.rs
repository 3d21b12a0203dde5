//! Error types for circuit-input assembly.

use thiserror::Error;

/// Pre-validation failures raised before any proof work starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
	/// Requested spend exceeds the input note's balance
	#[error("amount {requested} exceeds input balance {available}")]
	AmountExceedsBalance { requested: u128, available: u128 },

	/// More output chunks than the split circuit has slots for
	#[error("{chunks} chunks exceed the {max} split outputs")]
	TooManyChunks { chunks: usize, max: usize },

	/// Chunk list empty or its sum inconsistent with the input
	#[error("invalid chunk sum: {0}")]
	InvalidChunkSum(String),

	/// An amount sum left the representable range
	#[error("amount arithmetic overflow")]
	FieldOverflow,

	/// Malformed 20-byte address
	#[error("invalid address: {0}")]
	InvalidAddress(String),

	/// Input note has no confirmed position in the deposit tree
	#[error("input note is not confirmed in the deposit tree")]
	UnconfirmedInput,

	/// No denomination table for the requested token
	#[error("no denomination table for token {0:?}")]
	UnknownDenomTable(String),

	/// Prover calldata did not contain the expected elements
	#[error("malformed proof calldata: {0}")]
	MalformedCalldata(String),
}
