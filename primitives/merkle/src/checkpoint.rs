//! Exclusion-set checkpoints.
//!
//! Only the flagged-key set is persisted; the tree is rebuilt from the set
//! at load time. This keeps checkpoints small and tolerates arbitrary
//! process restarts at the cost of an O(n) rebuild.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use dp_zk_core::crypto::field::{strict_from_hex, to_bytes32_hex};
use dp_zk_core::Commitment;

use crate::error::MerkleError;
use crate::smt::ExclusionSmt;

const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Checkpoint {
	version: u32,
	/// Flagged commitments as 0x-prefixed hex, in canonical order
	flagged: Vec<String>,
}

impl ExclusionSmt {
	/// Serialize the flagged-key set to `path`.
	pub fn save_checkpoint(&self, path: &Path) -> Result<(), MerkleError> {
		let checkpoint = Checkpoint {
			version: CHECKPOINT_VERSION,
			flagged: self
				.flagged_keys()
				.iter()
				.map(|key| to_bytes32_hex(&key.inner()))
				.collect(),
		};
		let json = serde_json::to_string_pretty(&checkpoint)
			.map_err(|e| MerkleError::Checkpoint(e.to_string()))?;
		fs::write(path, json).map_err(|e| MerkleError::Checkpoint(e.to_string()))
	}

	/// Rebuild a tree from a checkpoint written by [`save_checkpoint`].
	///
	/// [`save_checkpoint`]: ExclusionSmt::save_checkpoint
	pub fn load_checkpoint(path: &Path) -> Result<Self, MerkleError> {
		let json = fs::read_to_string(path).map_err(|e| MerkleError::Checkpoint(e.to_string()))?;
		let checkpoint: Checkpoint =
			serde_json::from_str(&json).map_err(|e| MerkleError::Checkpoint(e.to_string()))?;

		if checkpoint.version != CHECKPOINT_VERSION {
			return Err(MerkleError::Checkpoint(format!(
				"unsupported checkpoint version {}",
				checkpoint.version
			)));
		}

		let mut keys = Vec::with_capacity(checkpoint.flagged.len());
		for hex in &checkpoint.flagged {
			let value =
				strict_from_hex(hex).map_err(|e| MerkleError::Checkpoint(e.to_string()))?;
			keys.push(Commitment::new(value));
		}
		Self::from_flagged(keys)
	}
}
