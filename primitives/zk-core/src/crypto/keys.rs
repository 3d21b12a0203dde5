//! # Session Key Derivation
//!
//! Derives the spending/nullifier key pair from a wallet signature and a
//! user PIN, and the read-only view keys auditors consume.
//!
//! ## Derivation
//!
//! ```text
//! password = utf8(signature) || utf8(pin)
//! out      = PBKDF2-HMAC-SHA512(password, "dust-stealth-v2", 100_000, 64)
//! spending_key  = mod_reduce(SHA-256(out[0..32]))
//! nullifier_key = mod_reduce(SHA-256(out[32..64]))
//! ```
//!
//! The two keys come from independent SHA-256 pre-images, so neither reveals
//! the other. Both lie in `(0, FIELD_ORDER)` with overwhelming probability.

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256, Sha512};

use crate::core::constants::{KDF_ITERATIONS, KDF_OUTPUT_LEN, KDF_SALT};
use crate::core::error::CoreError;
use crate::core::types::{NullifierKey, OwnerPubkey, SpendingKey};
use crate::crypto::field::mod_reduce;
use crate::crypto::hash::poseidon_hash_1;

/// The unlocked session's key pair.
///
/// Held in memory only; dropped on session lock. Never serialized.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SessionKeys {
	pub spending_key: SpendingKey,
	pub nullifier_key: NullifierKey,
}

impl SessionKeys {
	/// Owner public key: `Poseidon₁(spending_key)`.
	///
	/// Appears inside every note commitment to bind the note to its spender.
	pub fn owner_pubkey(&self) -> OwnerPubkey {
		poseidon_hash_1(&[self.spending_key.inner()])
	}

	/// Read-only view key for this session.
	pub fn view_key(&self) -> ViewKey {
		ViewKey {
			owner_pubkey: self.owner_pubkey(),
			nullifier_key: self.nullifier_key,
		}
	}
}

impl core::fmt::Debug for SessionKeys {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "SessionKeys(<redacted>)")
	}
}

/// View key: grants auditors read-only visibility over owned notes but no
/// spending authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewKey {
	/// Owner public key the disclosed notes belong to
	pub owner_pubkey: OwnerPubkey,
	/// Nullifier key, needed to recompute spent-note nullifiers
	pub nullifier_key: NullifierKey,
}

/// A view key restricted to a block-height window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopedViewKey {
	pub view_key: ViewKey,
	pub start_block: u64,
	pub end_block: u64,
}

impl ScopedViewKey {
	/// Create a scoped view key, validating `start_block <= end_block`.
	pub fn new(view_key: ViewKey, start_block: u64, end_block: u64) -> Result<Self, CoreError> {
		if start_block > end_block {
			return Err(CoreError::InvalidBlockRange {
				start: start_block,
				end: end_block,
			});
		}
		Ok(Self {
			view_key,
			start_block,
			end_block,
		})
	}
}

/// Derive the session key pair from a wallet signature and a PIN.
///
/// Deterministic in `(signature, pin)`: unlocking twice with the same inputs
/// yields the same keys on any device.
///
/// # Errors
/// - `PinRequired` when called without a PIN
/// - `KdfFailure` when called without a signature
pub fn derive_keys(signature: &str, pin: &str) -> Result<SessionKeys, CoreError> {
	if pin.is_empty() {
		return Err(CoreError::PinRequired);
	}
	if signature.is_empty() {
		return Err(CoreError::KdfFailure("empty signature".to_string()));
	}

	let mut password = Vec::with_capacity(signature.len() + pin.len());
	password.extend_from_slice(signature.as_bytes());
	password.extend_from_slice(pin.as_bytes());

	let mut derived = [0u8; KDF_OUTPUT_LEN];
	pbkdf2_hmac::<Sha512>(&password, KDF_SALT, KDF_ITERATIONS, &mut derived);

	let spending_seed = Sha256::digest(&derived[0..32]);
	let nullifier_seed = Sha256::digest(&derived[32..64]);

	Ok(SessionKeys {
		spending_key: SpendingKey::new(mod_reduce(&spending_seed)),
		nullifier_key: NullifierKey::new(mod_reduce(&nullifier_seed)),
	})
}
