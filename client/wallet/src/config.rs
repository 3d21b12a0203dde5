//! Per-chain client configuration.

use serde::{Deserialize, Serialize};

use dp_zk_core::{ChainId, EthAddress};

use crate::error::WalletError;

/// Configuration for one supported chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
	pub chain_id: ChainId,
	/// Compliance verifier contract, `0x`-hex; `None` disables the gate
	#[serde(default)]
	pub compliance_verifier: Option<String>,
	/// Relayer base URL (consumed by the HTTP adapter, not the core)
	#[serde(default)]
	pub relayer_url: Option<String>,
	/// RPC `eth_getLogs` block-range cap honored by event replay
	#[serde(default = "default_max_block_range")]
	pub max_block_range: u64,
	/// Deposit-confirmation polling attempts
	#[serde(default = "default_confirm_attempts")]
	pub confirm_poll_attempts: u32,
	/// Delay between confirmation polls, milliseconds
	#[serde(default = "default_confirm_interval_ms")]
	pub confirm_poll_interval_ms: u64,
}

fn default_max_block_range() -> u64 {
	10_000
}

fn default_confirm_attempts() -> u32 {
	20
}

fn default_confirm_interval_ms() -> u64 {
	2_000
}

impl ChainConfig {
	/// Config with the defaults for a chain without a compliance gate.
	pub fn new(chain_id: ChainId) -> Self {
		Self {
			chain_id,
			compliance_verifier: None,
			relayer_url: None,
			max_block_range: default_max_block_range(),
			confirm_poll_attempts: default_confirm_attempts(),
			confirm_poll_interval_ms: default_confirm_interval_ms(),
		}
	}

	/// The configured compliance verifier, parsed.
	///
	/// `None` (and the zero address) mean the gate is disabled.
	pub fn compliance_verifier_address(&self) -> Result<Option<EthAddress>, WalletError> {
		let Some(hex) = &self.compliance_verifier else {
			return Ok(None);
		};
		let digits = hex.strip_prefix("0x").unwrap_or(hex);
		if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return Err(WalletError::Input(
				dp_circuit_inputs::InputError::InvalidAddress(hex.clone()),
			));
		}
		let mut address = [0u8; 20];
		for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
			let byte = u8::from_str_radix(std::str::from_utf8(chunk).expect("hex is ascii"), 16)
				.expect("validated hex digits");
			address[i] = byte;
		}
		if address == [0u8; 20] {
			return Ok(None);
		}
		Ok(Some(address))
	}
}
