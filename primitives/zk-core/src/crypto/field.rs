//! # Field Codecs
//!
//! Conversions between BN254 scalar field elements and the wire formats the
//! rest of the system speaks: `0x`-prefixed 32-byte hex, bare 64-char hex,
//! decimal strings (prover and relayer JSON), and raw big-endian bytes.
//!
//! Two hex decoders are exposed on purpose:
//! - [`strict_from_hex`] rejects everything that is not a well-formed field
//!   element and is the decoder for all protocol surfaces;
//! - [`lenient_from_hex`] additionally maps the empty string to zero. It
//!   exists solely for the encrypted-note storage adaptor, whose payload
//!   fields are deliberately blank before decryption.

use ark_ff::{BigInteger, PrimeField};
use core::str::FromStr;
use rand::RngCore;

use crate::core::constants::{BLINDING_BYTES, FIELD_ELEMENT_SIZE};
use crate::core::error::CoreError;
use crate::core::types::{Bn254Fr, EthAddress};

/// Encode a field element as `0x` + 64 lowercase hex characters (big-endian,
/// left-zero-padded).
pub fn to_bytes32_hex(value: &Bn254Fr) -> String {
	format!("0x{}", to_hex64(value))
}

/// Encode a field element as 64 lowercase hex characters without a prefix.
///
/// This is the form used inside serialized view keys.
pub fn to_hex64(value: &Bn254Fr) -> String {
	hex::encode(to_be_bytes(value))
}

/// Canonical 32-byte big-endian encoding of a field element.
pub fn to_be_bytes(value: &Bn254Fr) -> [u8; FIELD_ELEMENT_SIZE] {
	let bytes = value.into_bigint().to_bytes_be();
	let mut out = [0u8; FIELD_ELEMENT_SIZE];
	out[FIELD_ELEMENT_SIZE - bytes.len()..].copy_from_slice(&bytes);
	out
}

/// Strictly decode a `0x`-prefixed hex string into a field element.
///
/// # Errors
/// - `InvalidHex`: missing prefix, non-hex characters, or more than 64 digits
/// - `OutOfField`: the value is not a canonical BN254 scalar
pub fn strict_from_hex(input: &str) -> Result<Bn254Fr, CoreError> {
	let digits = input
		.strip_prefix("0x")
		.or_else(|| input.strip_prefix("0X"))
		.ok_or_else(|| CoreError::InvalidHex(input.to_string()))?;

	if digits.is_empty() || digits.len() > 2 * FIELD_ELEMENT_SIZE {
		return Err(CoreError::InvalidHex(input.to_string()));
	}

	// Tolerate odd-length digit strings the way EVM tooling emits them
	let padded = if digits.len() % 2 == 1 {
		format!("0{digits}")
	} else {
		digits.to_string()
	};

	let raw = hex::decode(&padded).map_err(|_| CoreError::InvalidHex(input.to_string()))?;
	let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
	bytes[FIELD_ELEMENT_SIZE - raw.len()..].copy_from_slice(&raw);

	let value = Bn254Fr::from_be_bytes_mod_order(&bytes);
	// A non-canonical input reduces to a different byte string
	if to_be_bytes(&value) != bytes {
		return Err(CoreError::OutOfField);
	}
	Ok(value)
}

/// Decode a hex string, mapping the empty string (or a bare `0x`) to zero.
///
/// Only the encrypted-note storage adaptor may use this decoder; everywhere
/// else an empty field is a bug that [`strict_from_hex`] surfaces.
pub fn lenient_from_hex(input: &str) -> Result<Bn254Fr, CoreError> {
	if input.is_empty() || input == "0x" || input == "0X" {
		return Ok(Bn254Fr::from(0u64));
	}
	strict_from_hex(input)
}

/// Reduce arbitrary big-endian bytes modulo the field order.
pub fn mod_reduce(bytes: &[u8]) -> Bn254Fr {
	Bn254Fr::from_be_bytes_mod_order(bytes)
}

/// Sample a blinding factor uniformly from `[0, 2^248)`.
///
/// 31 bytes from the OS CSPRNG; the top byte stays zero so the value is
/// always below the field order without reduction bias.
pub fn rand_field_248bit() -> Bn254Fr {
	let mut bytes = [0u8; BLINDING_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	Bn254Fr::from_be_bytes_mod_order(&bytes)
}

/// Embed a 20-byte EVM address into the field (big-endian).
pub fn address_to_field(address: &EthAddress) -> Bn254Fr {
	Bn254Fr::from_be_bytes_mod_order(address)
}

/// Encode a field element as a decimal string (prover/relayer JSON format).
pub fn fr_to_dec(value: &Bn254Fr) -> String {
	value.into_bigint().to_string()
}

/// Decode a decimal string into a field element.
pub fn fr_from_dec(input: &str) -> Result<Bn254Fr, CoreError> {
	if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
		return Err(CoreError::InvalidDecimal(input.to_string()));
	}
	Bn254Fr::from_str(input).map_err(|_| CoreError::InvalidDecimal(input.to_string()))
}
