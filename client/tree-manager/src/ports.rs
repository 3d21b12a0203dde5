//! Ports onto the chain: deposit-event scanning and root posting.

use async_trait::async_trait;

use dp_zk_core::{Bn254Fr, ChainId, MerkleRoot};

use crate::error::TreeManagerError;

/// One `DepositQueued` event as emitted by the pool contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositEvent {
	pub block_number: u64,
	pub log_index: u32,
	/// Position the contract assigned in the deposit queue
	pub queue_index: u64,
	pub commitment: Bn254Fr,
}

/// Block-ranged scan over the contract's deposit events.
#[async_trait]
pub trait DepositEventSource: Send + Sync {
	async fn latest_block(&self, chain_id: ChainId) -> Result<u64, TreeManagerError>;

	/// Events in `[from_block, to_block]`, in whatever order the RPC
	/// returns them; the caller re-sorts into queue order.
	async fn deposit_events(
		&self,
		chain_id: ChainId,
		from_block: u64,
		to_block: u64,
	) -> Result<Vec<DepositEvent>, TreeManagerError>;
}

/// Submits `updateRoot` transactions.
#[async_trait]
pub trait RootPoster: Send + Sync {
	/// Post a new root; returns the transaction hash.
	async fn update_root(
		&self,
		chain_id: ChainId,
		root: &MerkleRoot,
	) -> Result<String, TreeManagerError>;
}
