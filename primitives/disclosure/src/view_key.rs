//! View-key serialization.
//!
//! Two persisted formats:
//!
//! ```text
//! dvk1:<64-hex ownerPubKey>:<64-hex nullifierKey>
//! dvk2:<64-hex ownerPubKey>:<64-hex nullifierKey>:<dec startBlock>:<dec endBlock>
//! ```
//!
//! Hex fields are exactly 64 hex characters without a prefix; block heights
//! are non-negative decimals with `startBlock <= endBlock`.

use dp_zk_core::crypto::field::{strict_from_hex, to_hex64};
use dp_zk_core::{NullifierKey, ScopedViewKey, ViewKey};

use crate::error::DisclosureError;

const PLAIN_PREFIX: &str = "dvk1";
const SCOPED_PREFIX: &str = "dvk2";

/// A parsed view key of either format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedViewKey {
	Plain(ViewKey),
	Scoped(ScopedViewKey),
}

/// Serialize a plain view key.
pub fn serialize_plain(view_key: &ViewKey) -> String {
	format!(
		"{PLAIN_PREFIX}:{}:{}",
		to_hex64(&view_key.owner_pubkey),
		to_hex64(&view_key.nullifier_key.inner())
	)
}

/// Serialize a block-scoped view key.
pub fn serialize_scoped(scoped: &ScopedViewKey) -> String {
	format!(
		"{SCOPED_PREFIX}:{}:{}:{}:{}",
		to_hex64(&scoped.view_key.owner_pubkey),
		to_hex64(&scoped.view_key.nullifier_key.inner()),
		scoped.start_block,
		scoped.end_block
	)
}

/// Parse either serialized form, dispatching on the prefix.
pub fn parse(input: &str) -> Result<ParsedViewKey, DisclosureError> {
	let parts: Vec<&str> = input.split(':').collect();
	match parts.as_slice() {
		[PLAIN_PREFIX, owner, nullifier] => {
			Ok(ParsedViewKey::Plain(parse_pair(owner, nullifier)?))
		}
		[SCOPED_PREFIX, owner, nullifier, start, end] => {
			let view_key = parse_pair(owner, nullifier)?;
			let start_block = parse_block(start)?;
			let end_block = parse_block(end)?;
			let scoped = ScopedViewKey::new(view_key, start_block, end_block)
				.map_err(|e| DisclosureError::InvalidViewKey(e.to_string()))?;
			Ok(ParsedViewKey::Scoped(scoped))
		}
		_ => Err(DisclosureError::InvalidViewKey(format!(
			"unrecognized format: {input:?}"
		))),
	}
}

fn parse_pair(owner: &str, nullifier: &str) -> Result<ViewKey, DisclosureError> {
	Ok(ViewKey {
		owner_pubkey: parse_hex64(owner)?,
		nullifier_key: NullifierKey::new(parse_hex64(nullifier)?),
	})
}

fn parse_hex64(field: &str) -> Result<dp_zk_core::Bn254Fr, DisclosureError> {
	if field.len() != 64 || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(DisclosureError::InvalidViewKey(format!(
			"expected 64 hex characters, got {field:?}"
		)));
	}
	strict_from_hex(&format!("0x{field}"))
		.map_err(|e| DisclosureError::InvalidViewKey(e.to_string()))
}

fn parse_block(field: &str) -> Result<u64, DisclosureError> {
	if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
		return Err(DisclosureError::InvalidViewKey(format!(
			"invalid block height {field:?}"
		)));
	}
	field
		.parse()
		.map_err(|_| DisclosureError::InvalidViewKey(format!("block height overflow: {field}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use dp_zk_core::derive_keys;

	fn view_key() -> ViewKey {
		derive_keys("0xabcd", "123456").unwrap().view_key()
	}

	#[test]
	fn test_plain_round_trip() {
		let vk = view_key();
		let serialized = serialize_plain(&vk);
		assert!(serialized.starts_with("dvk1:"));
		assert_eq!(parse(&serialized).unwrap(), ParsedViewKey::Plain(vk));
	}

	#[test]
	fn test_scoped_round_trip() {
		let scoped = ScopedViewKey::new(view_key(), 100, 2000).unwrap();
		let serialized = serialize_scoped(&scoped);
		assert!(serialized.starts_with("dvk2:"));
		assert_eq!(parse(&serialized).unwrap(), ParsedViewKey::Scoped(scoped));
	}

	#[test]
	fn test_rejects_unknown_prefix() {
		assert!(parse("dvk3:00:11").is_err());
		assert!(parse("").is_err());
	}

	#[test]
	fn test_rejects_wrong_part_count() {
		let vk = view_key();
		let plain = serialize_plain(&vk);
		// A dvk1 with trailing parts is not a dvk2
		assert!(parse(&format!("{plain}:10")).is_err());
	}

	#[test]
	fn test_rejects_short_hex() {
		assert!(parse(&format!("dvk1:{}:{}", "ab", "cd")).is_err());
	}

	#[test]
	fn test_rejects_non_hex_field() {
		let bad = "zz".repeat(32);
		let good = "ab".repeat(32);
		assert!(parse(&format!("dvk1:{bad}:{good}")).is_err());
	}

	#[test]
	fn test_rejects_inverted_block_range() {
		let vk = view_key();
		let owner = to_hex64(&vk.owner_pubkey);
		let nullifier = to_hex64(&vk.nullifier_key.inner());
		assert!(parse(&format!("dvk2:{owner}:{nullifier}:50:10")).is_err());
	}

	#[test]
	fn test_rejects_negative_block() {
		let vk = view_key();
		let owner = to_hex64(&vk.owner_pubkey);
		let nullifier = to_hex64(&vk.nullifier_key.inner());
		assert!(parse(&format!("dvk2:{owner}:{nullifier}:-1:10")).is_err());
	}
}
