//! # Note Cipher
//!
//! AES-256-GCM encryption of note payloads at rest.
//!
//! The storage key is derived from the spending key with domain-separated
//! SHA-256, so every wallet encrypts with a key only it can rebuild. Each
//! encryption draws a fresh 12-byte nonce; identical payloads therefore
//! produce distinct ciphertexts.

use aes_gcm::{
	aead::{Aead, KeyInit},
	Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::constants::{NONCE_SIZE, STORAGE_KEY_DOMAIN};
use crate::core::error::CoreError;
use crate::core::types::{ChainId, SpendingKey};
use crate::crypto::field::{lenient_from_hex, to_bytes32_hex, to_be_bytes};
use crate::models::note::Note;

/// The canonical plaintext form of an encrypted note.
///
/// Field order is the canonical serialization order; all values are
/// `0x`-prefixed hex strings. Fields may be blank in a freshly loaded
/// record before decryption, which is why [`NotePayload::to_note`] decodes
/// with the lenient (empty-as-zero) codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePayload {
	pub owner: String,
	pub amount: String,
	pub asset: String,
	pub blinding: String,
}

impl NotePayload {
	/// Capture a note's secret fields for encryption.
	pub fn from_note(note: &Note) -> Self {
		Self {
			owner: to_bytes32_hex(&note.owner),
			amount: format!("0x{:x}", note.amount),
			asset: to_bytes32_hex(&note.asset),
			blinding: to_bytes32_hex(&note.blinding),
		}
	}

	/// Rebuild a note from a decrypted payload.
	pub fn to_note(&self, chain_id: ChainId) -> Result<Note, CoreError> {
		let amount_digits = self
			.amount
			.strip_prefix("0x")
			.unwrap_or(self.amount.as_str());
		let amount = if amount_digits.is_empty() {
			0
		} else {
			u128::from_str_radix(amount_digits, 16)
				.map_err(|_| CoreError::InvalidHex(self.amount.clone()))?
		};

		Ok(Note {
			owner: lenient_from_hex(&self.owner)?,
			amount,
			asset: lenient_from_hex(&self.asset)?,
			chain_id,
			blinding: lenient_from_hex(&self.blinding)?,
		})
	}

	/// Stable canonical serialization used as the AEAD plaintext.
	fn canonical_bytes(&self) -> Result<Vec<u8>, CoreError> {
		serde_json::to_vec(self).map_err(|e| CoreError::CryptoFailure(e.to_string()))
	}
}

/// An encrypted note payload: ciphertext plus the nonce it was sealed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedNote {
	pub ciphertext: Vec<u8>,
	pub nonce: [u8; NONCE_SIZE],
}

/// AES-256-GCM cipher bound to one wallet's storage key.
pub struct NoteCipher {
	key: [u8; 32],
}

impl NoteCipher {
	/// Derive the storage key from the spending key:
	/// `SHA-256(spending_key_bytes || "dust-note-storage-v1")`.
	pub fn from_spending_key(spending_key: &SpendingKey) -> Self {
		let mut hasher = Sha256::new();
		hasher.update(to_be_bytes(&spending_key.inner()));
		hasher.update(STORAGE_KEY_DOMAIN);
		Self {
			key: hasher.finalize().into(),
		}
	}

	/// Encrypt a payload with a fresh random nonce.
	pub fn encrypt(&self, payload: &NotePayload) -> Result<EncryptedNote, CoreError> {
		let mut nonce = [0u8; NONCE_SIZE];
		rand::thread_rng().fill_bytes(&mut nonce);

		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
		let plaintext = payload.canonical_bytes()?;
		let ciphertext = cipher
			.encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
			.map_err(|_| CoreError::CryptoFailure("AES-GCM encryption failed".to_string()))?;

		Ok(EncryptedNote { ciphertext, nonce })
	}

	/// Decrypt a payload.
	///
	/// Fails with `AuthTagMismatch` on a wrong key or tampered ciphertext.
	pub fn decrypt(&self, encrypted: &EncryptedNote) -> Result<NotePayload, CoreError> {
		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
		let plaintext = cipher
			.decrypt(Nonce::from_slice(&encrypted.nonce), encrypted.ciphertext.as_ref())
			.map_err(|_| CoreError::AuthTagMismatch)?;

		serde_json::from_slice(&plaintext).map_err(|e| CoreError::CryptoFailure(e.to_string()))
	}
}

impl core::fmt::Debug for NoteCipher {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "NoteCipher(<redacted>)")
	}
}
