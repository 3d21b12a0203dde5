//! # Core Types
//!
//! Fundamental type definitions for the shielded-pool primitives.

use ark_bn254::Fr;

// ============================================================================
// Field Element
// ============================================================================

/// Field element type for the BN254 scalar field
///
/// This is the base type for all cryptographic operations in the system.
pub type Bn254Fr = Fr;

// ============================================================================
// Strong Types (New-type Pattern)
// ============================================================================

/// A note commitment (Poseidon hash of note contents)
///
/// Strong type to prevent mixing up commitments with other field elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Commitment(pub Bn254Fr);

impl Commitment {
	/// Create from field element
	pub fn new(value: Bn254Fr) -> Self {
		Self(value)
	}

	/// Get inner field element
	pub fn inner(&self) -> Bn254Fr {
		self.0
	}
}

impl From<Bn254Fr> for Commitment {
	fn from(value: Bn254Fr) -> Self {
		Self(value)
	}
}

impl From<Commitment> for Bn254Fr {
	fn from(commitment: Commitment) -> Self {
		commitment.0
	}
}

/// A nullifier (hash that marks a note as spent)
///
/// Strong type to prevent mixing up nullifiers with other field elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Nullifier(pub Bn254Fr);

impl Nullifier {
	/// Create from field element
	pub fn new(value: Bn254Fr) -> Self {
		Self(value)
	}

	/// Get inner field element
	pub fn inner(&self) -> Bn254Fr {
		self.0
	}

	/// The zero nullifier used for dummy input slots
	pub fn zero() -> Self {
		Self(Bn254Fr::from(0u64))
	}

	/// Dummy slots carry a zero nullifier
	pub fn is_zero(&self) -> bool {
		self.0 == Bn254Fr::from(0u64)
	}
}

impl From<Bn254Fr> for Nullifier {
	fn from(value: Bn254Fr) -> Self {
		Self(value)
	}
}

impl From<Nullifier> for Bn254Fr {
	fn from(nullifier: Nullifier) -> Self {
		nullifier.0
	}
}

/// A spending key (private key binding notes to their owner)
///
/// Held in memory for the unlocked session only; never persisted.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SpendingKey(pub Bn254Fr);

impl SpendingKey {
	/// Create from field element
	pub fn new(value: Bn254Fr) -> Self {
		Self(value)
	}

	/// Get inner field element
	pub fn inner(&self) -> Bn254Fr {
		self.0
	}
}

impl core::fmt::Debug for SpendingKey {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		// Never leak key material through Debug output
		write!(f, "SpendingKey(<redacted>)")
	}
}

impl From<Bn254Fr> for SpendingKey {
	fn from(value: Bn254Fr) -> Self {
		Self(value)
	}
}

/// A nullifier key, derived independently of the spending key
///
/// Required to compute nullifiers; shared with auditors as part of a view
/// key, but grants no spending authority.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NullifierKey(pub Bn254Fr);

impl NullifierKey {
	/// Create from field element
	pub fn new(value: Bn254Fr) -> Self {
		Self(value)
	}

	/// Get inner field element
	pub fn inner(&self) -> Bn254Fr {
		self.0
	}
}

impl core::fmt::Debug for NullifierKey {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "NullifierKey(<redacted>)")
	}
}

impl From<Bn254Fr> for NullifierKey {
	fn from(value: Bn254Fr) -> Self {
		Self(value)
	}
}

// ============================================================================
// Type Aliases
// ============================================================================

/// A Merkle tree root
pub type MerkleRoot = Bn254Fr;

/// A blinding factor (random value for hiding)
pub type Blinding = Bn254Fr;

/// An owner's public key: `Poseidon₁(spending_key)`
pub type OwnerPubkey = Bn254Fr;

/// An asset identifier: `Poseidon₂(chain_id, token_address)`
pub type AssetId = Bn254Fr;

/// An EVM chain identifier
pub type ChainId = u64;

/// A 20-byte EVM address
pub type EthAddress = [u8; 20];
