//! # Constants
//!
//! Global constants for the Dust cryptographic core.

// ============================================================================
// Key Derivation
// ============================================================================

/// PBKDF2 salt for session-key derivation.
///
/// Changing this value invalidates every previously derived key pair.
pub const KDF_SALT: &[u8] = b"dust-stealth-v2";

/// PBKDF2-HMAC-SHA512 iteration count
pub const KDF_ITERATIONS: u32 = 100_000;

/// PBKDF2 output length (two 32-byte seeds)
pub const KDF_OUTPUT_LEN: usize = 64;

// ============================================================================
// Note Encryption
// ============================================================================

/// Domain separator for the at-rest note storage key
pub const STORAGE_KEY_DOMAIN: &[u8] = b"dust-note-storage-v1";

/// AES-GCM nonce length in bytes
pub const NONCE_SIZE: usize = 12;

// ============================================================================
// Serialization
// ============================================================================

/// Field element size in bytes
pub const FIELD_ELEMENT_SIZE: usize = 32;

/// Blinding factors are sampled uniformly from [0, 2^248)
pub const BLINDING_BYTES: usize = 31;
