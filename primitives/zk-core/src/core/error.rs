//! # Errors
//!
//! Error types for core cryptographic operations.

use thiserror::Error;

/// Errors that can occur in core primitive operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
	/// Malformed hex input (bad prefix, non-hex characters, or wrong length)
	#[error("invalid hex string: {0}")]
	InvalidHex(String),

	/// Malformed decimal field-element string
	#[error("invalid decimal string: {0}")]
	InvalidDecimal(String),

	/// Value is not a canonical BN254 scalar
	#[error("value exceeds the BN254 scalar field order")]
	OutOfField,

	/// Key derivation was invoked without a PIN
	#[error("a PIN is required for key derivation")]
	PinRequired,

	/// Key derivation failed
	#[error("key derivation failed: {0}")]
	KdfFailure(String),

	/// A block-scoped view key with `start_block > end_block`
	#[error("invalid block range: start {start} > end {end}")]
	InvalidBlockRange { start: u64, end: u64 },

	/// Host crypto subsystem failure (Poseidon parameters, AEAD setup)
	#[error("crypto failure: {0}")]
	CryptoFailure(String),

	/// AEAD authentication failed: wrong key or tampered ciphertext
	#[error("authentication tag mismatch (wrong key or tampered ciphertext)")]
	AuthTagMismatch,
}
