//! FFLONK proof-calldata parsing.
//!
//! The prover emits its calldata as comma/whitespace-separated hex tokens.
//! The on-chain verifier expects the first 24 field elements concatenated
//! into one `0x`-prefixed 768-byte blob, followed by the circuit's public
//! signals (2, 9, or 15 elements depending on the circuit).

use once_cell::sync::Lazy;
use regex::Regex;

use dp_zk_core::crypto::field::mod_reduce;
use dp_zk_core::Bn254Fr;

use crate::error::InputError;

/// Field elements forming the proof blob
pub const PROOF_WORDS: usize = 24;

static HEX_TOKEN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]+").expect("static regex compiles"));

/// A parsed prover calldata string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCalldata {
	/// `0x` + 1536 hex chars: the 24 proof words, 32 bytes each
	pub proof: String,
	/// The public signals that followed the proof
	pub public_signals: Vec<Bn254Fr>,
}

/// Extract the proof blob and `expected_signals` public signals from raw
/// prover calldata.
pub fn parse_fflonk_calldata(
	raw: &str,
	expected_signals: usize,
) -> Result<ParsedCalldata, InputError> {
	let tokens: Vec<&str> = HEX_TOKEN.find_iter(raw).map(|m| m.as_str()).collect();

	let needed = PROOF_WORDS + expected_signals;
	if tokens.len() < needed {
		return Err(InputError::MalformedCalldata(format!(
			"expected {needed} hex elements, found {}",
			tokens.len()
		)));
	}

	let mut proof = String::with_capacity(2 + PROOF_WORDS * 64);
	proof.push_str("0x");
	for token in &tokens[..PROOF_WORDS] {
		proof.push_str(&pad_word(token)?);
	}

	let mut public_signals = Vec::with_capacity(expected_signals);
	for token in &tokens[PROOF_WORDS..needed] {
		let bytes = hex_bytes(token)?;
		public_signals.push(mod_reduce(&bytes));
	}

	Ok(ParsedCalldata {
		proof,
		public_signals,
	})
}

/// Left-pad an `0x…` token to a full 64-char word.
fn pad_word(token: &str) -> Result<String, InputError> {
	let digits = &token[2..];
	if digits.len() > 64 {
		return Err(InputError::MalformedCalldata(format!(
			"hex element wider than 32 bytes: {token}"
		)));
	}
	Ok(format!("{digits:0>64}").to_ascii_lowercase())
}

fn hex_bytes(token: &str) -> Result<Vec<u8>, InputError> {
	let padded = pad_word(token)?;
	hex::decode(padded).map_err(|e| InputError::MalformedCalldata(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn word(n: u64) -> String {
		format!("0x{n:064x}")
	}

	fn calldata_with(signals: &[u64]) -> String {
		let mut tokens: Vec<String> = (1..=PROOF_WORDS as u64).map(word).collect();
		tokens.extend(signals.iter().map(|s| format!("0x{s:x}")));
		format!("[{}]", tokens.join(", "))
	}

	#[test]
	fn test_parse_extracts_proof_and_signals() {
		let raw = calldata_with(&[77, 88]);
		let parsed = parse_fflonk_calldata(&raw, 2).unwrap();

		// 0x + 24 * 64 hex chars = 768 bytes of proof
		assert_eq!(parsed.proof.len(), 2 + PROOF_WORDS * 64);
		assert!(parsed.proof.starts_with("0x"));
		assert_eq!(parsed.public_signals.len(), 2);
		assert_eq!(parsed.public_signals[0], Bn254Fr::from(77u64));
		assert_eq!(parsed.public_signals[1], Bn254Fr::from(88u64));
	}

	#[test]
	fn test_parse_pads_narrow_words() {
		let raw = calldata_with(&[1, 2]);
		let parsed = parse_fflonk_calldata(&raw, 2).unwrap();
		// First proof word was 0x1; it must occupy a full 64-char slot
		assert_eq!(&parsed.proof[2..66], &format!("{:064x}", 1u64));
	}

	#[test]
	fn test_parse_tolerates_separator_noise() {
		let tokens: Vec<String> = (1..=26u64).map(|n| format!("0x{n:x}")).collect();
		let raw = format!("  {}  \n", tokens.join(" \t,\n"));
		assert!(parse_fflonk_calldata(&raw, 2).is_ok());
	}

	#[test]
	fn test_parse_rejects_short_calldata() {
		let raw = calldata_with(&[]);
		assert!(matches!(
			parse_fflonk_calldata(&raw, 2),
			Err(InputError::MalformedCalldata(_))
		));
	}

	#[test]
	fn test_parse_rejects_wide_words() {
		let wide = format!("0x{}", "ab".repeat(40));
		let mut tokens: Vec<String> = (1..=25u64).map(word).collect();
		tokens[0] = wide;
		let raw = tokens.join(",");
		assert!(matches!(
			parse_fflonk_calldata(&raw, 1),
			Err(InputError::MalformedCalldata(_))
		));
	}
}
