//! Per-chain tree managers and their registry.

use std::collections::HashMap;
use std::sync::Arc;

use dp_merkle::incremental::MerklePath;
use dp_merkle::IncrementalMerkleTree;
use dp_zk_core::{ChainId, Commitment, MerkleRoot};

use crate::error::TreeManagerError;
use crate::ports::{DepositEventSource, RootPoster};

struct ChainTreeState {
	tree: IncrementalMerkleTree,
	last_synced_block: u64,
	last_posted_root: Option<MerkleRoot>,
}

/// Mirrors one chain's deposit tree from its event stream.
///
/// All state lives behind a single async mutex, so concurrent `sync` calls
/// serialize: the second caller waits, finds the tree already caught up,
/// and returns without duplicate RPC work.
pub struct ChainTreeManager {
	chain_id: ChainId,
	events: Arc<dyn DepositEventSource>,
	poster: Arc<dyn RootPoster>,
	/// RPC block-range cap per `deposit_events` request
	max_block_range: u64,
	state: tokio::sync::Mutex<ChainTreeState>,
}

impl ChainTreeManager {
	/// `deploy_block` is the pool contract's deployment height; scanning
	/// starts there.
	pub fn new(
		chain_id: ChainId,
		events: Arc<dyn DepositEventSource>,
		poster: Arc<dyn RootPoster>,
		deploy_block: u64,
		max_block_range: u64,
	) -> Self {
		Self {
			chain_id,
			events,
			poster,
			max_block_range: max_block_range.max(1),
			state: tokio::sync::Mutex::new(ChainTreeState {
				tree: IncrementalMerkleTree::new(),
				last_synced_block: deploy_block.saturating_sub(1),
				last_posted_root: None,
			}),
		}
	}

	/// Replay all deposit events up to the chain head.
	///
	/// Events are fetched in block-range chunks, re-sorted into
	/// `(block_number, log_index)` order, and inserted strictly by queue
	/// index. A skipped index aborts with `EventGapDetected`; indices the
	/// tree already holds are tolerated (overlapping rescans).
	pub async fn sync(&self) -> Result<(), TreeManagerError> {
		let mut state = self.state.lock().await;
		let latest = self.events.latest_block(self.chain_id).await?;

		while state.last_synced_block < latest {
			let from = state.last_synced_block + 1;
			let to = (from + self.max_block_range - 1).min(latest);

			let mut batch = self.events.deposit_events(self.chain_id, from, to).await?;
			// On-chain queue order, never RPC-return order
			batch.sort_by_key(|event| (event.block_number, event.log_index));

			for event in batch {
				let count = state.tree.leaf_count();
				if event.queue_index < count {
					continue;
				}
				if event.queue_index > count {
					return Err(TreeManagerError::EventGapDetected {
						expected: count,
						found: event.queue_index,
					});
				}
				state.tree.insert(event.commitment)?;
			}

			state.last_synced_block = to;
		}

		log::debug!(
			"chain {} synced to block {} ({} leaves)",
			self.chain_id,
			state.last_synced_block,
			state.tree.leaf_count()
		);
		Ok(())
	}

	/// Post the current root on-chain if it differs from the last one
	/// posted. Returns the transaction hash when a post happened.
	pub async fn post_root_if_needed(&self) -> Result<Option<String>, TreeManagerError> {
		let mut state = self.state.lock().await;
		let root = state.tree.root();
		if state.last_posted_root == Some(root) {
			return Ok(None);
		}

		let tx_hash = self.poster.update_root(self.chain_id, &root).await?;
		state.last_posted_root = Some(root);
		log::info!("chain {}: posted root in tx {tx_hash}", self.chain_id);
		Ok(Some(tx_hash))
	}

	/// Sibling path for `leaf_index`, after a sync-and-post barrier.
	pub async fn proof_for(&self, leaf_index: u64) -> Result<MerklePath, TreeManagerError> {
		self.sync().await?;
		self.post_root_if_needed().await?;
		let state = self.state.lock().await;
		Ok(state.tree.proof(leaf_index)?)
	}

	/// Current root (after a sync barrier).
	pub async fn root(&self) -> Result<MerkleRoot, TreeManagerError> {
		self.sync().await?;
		Ok(self.state.lock().await.tree.root())
	}

	/// Number of mirrored leaves (after a sync barrier).
	pub async fn leaf_count(&self) -> Result<u64, TreeManagerError> {
		self.sync().await?;
		Ok(self.state.lock().await.tree.leaf_count())
	}

	/// Queue position of a commitment, if it has been mirrored.
	pub async fn leaf_index_of(
		&self,
		commitment: &Commitment,
	) -> Result<Option<u64>, TreeManagerError> {
		self.sync().await?;
		Ok(self.state.lock().await.tree.leaf_index_of(commitment))
	}
}

/// Explicit handle over all per-chain managers.
///
/// Passed through instead of living in module statics, so tests can stand
/// up isolated registries.
pub struct TreeRegistry {
	events: Arc<dyn DepositEventSource>,
	poster: Arc<dyn RootPoster>,
	managers: parking_lot::Mutex<HashMap<ChainId, Arc<ChainTreeManager>>>,
}

impl TreeRegistry {
	pub fn new(events: Arc<dyn DepositEventSource>, poster: Arc<dyn RootPoster>) -> Self {
		Self {
			events,
			poster,
			managers: parking_lot::Mutex::new(HashMap::new()),
		}
	}

	/// Register a chain; replaces any previous manager for it.
	pub fn register(
		&self,
		chain_id: ChainId,
		deploy_block: u64,
		max_block_range: u64,
	) -> Arc<ChainTreeManager> {
		let manager = Arc::new(ChainTreeManager::new(
			chain_id,
			Arc::clone(&self.events),
			Arc::clone(&self.poster),
			deploy_block,
			max_block_range,
		));
		self.managers.lock().insert(chain_id, Arc::clone(&manager));
		manager
	}

	/// Manager for a registered chain.
	pub fn get(&self, chain_id: ChainId) -> Result<Arc<ChainTreeManager>, TreeManagerError> {
		self.managers
			.lock()
			.get(&chain_id)
			.cloned()
			.ok_or(TreeManagerError::UnknownChain(chain_id))
	}
}
