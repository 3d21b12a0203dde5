//! Integration tests for deposit-event replay

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dc_tree_manager::{
	ChainTreeManager, DepositEvent, DepositEventSource, RootPoster, TreeManagerError, TreeRegistry,
};
use dp_merkle::incremental::verify_proof;
use dp_merkle::IncrementalMerkleTree;
use dp_zk_core::{Bn254Fr, ChainId, Commitment, MerkleRoot};

const CHAIN_ID: ChainId = 11155111;

fn commitment(n: u64) -> Bn254Fr {
	Bn254Fr::from(1000 + n)
}

/// Scripted event source over a fixed on-chain history.
struct MockEvents {
	latest_block: u64,
	events: Vec<DepositEvent>,
	/// (from, to) of every range request, for chunking assertions
	requests: Mutex<Vec<(u64, u64)>>,
	latest_calls: AtomicU32,
}

impl MockEvents {
	/// One deposit per block starting at block 100, queue order reversed
	/// within each response to prove the manager re-sorts.
	fn with_deposits(count: u64, latest_block: u64) -> Self {
		let events = (0..count)
			.map(|n| DepositEvent {
				block_number: 100 + n,
				log_index: 0,
				queue_index: n,
				commitment: commitment(n),
			})
			.collect();
		Self {
			latest_block,
			events,
			requests: Mutex::new(Vec::new()),
			latest_calls: AtomicU32::new(0),
		}
	}
}

#[async_trait]
impl DepositEventSource for MockEvents {
	async fn latest_block(&self, _chain_id: ChainId) -> Result<u64, TreeManagerError> {
		self.latest_calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.latest_block)
	}

	async fn deposit_events(
		&self,
		_chain_id: ChainId,
		from_block: u64,
		to_block: u64,
	) -> Result<Vec<DepositEvent>, TreeManagerError> {
		self.requests.lock().unwrap().push((from_block, to_block));
		let mut batch: Vec<DepositEvent> = self
			.events
			.iter()
			.filter(|e| e.block_number >= from_block && e.block_number <= to_block)
			.copied()
			.collect();
		// RPC-return order is not queue order
		batch.reverse();
		Ok(batch)
	}
}

#[derive(Default)]
struct MockPoster {
	posted: Mutex<Vec<MerkleRoot>>,
	fail_next: AtomicU32,
}

#[async_trait]
impl RootPoster for MockPoster {
	async fn update_root(
		&self,
		_chain_id: ChainId,
		root: &MerkleRoot,
	) -> Result<String, TreeManagerError> {
		if self.fail_next.load(Ordering::SeqCst) > 0 {
			self.fail_next.fetch_sub(1, Ordering::SeqCst);
			return Err(TreeManagerError::PostRootReverted("out of gas".to_string()));
		}
		let mut posted = self.posted.lock().unwrap();
		posted.push(*root);
		Ok(format!("0xroot{}", posted.len()))
	}
}

fn manager(events: Arc<MockEvents>, poster: Arc<MockPoster>) -> ChainTreeManager {
	ChainTreeManager::new(CHAIN_ID, events, poster, 100, 10)
}

#[tokio::test]
async fn test_replay_matches_reference_tree() {
	let events = Arc::new(MockEvents::with_deposits(25, 130));
	let manager = manager(Arc::clone(&events), Arc::new(MockPoster::default()));

	manager.sync().await.unwrap();

	// Prefix-equivalence: a locally built tree over the same commitments
	// produces the identical root
	let mut reference = IncrementalMerkleTree::new();
	for n in 0..25 {
		reference.insert(commitment(n)).unwrap();
	}
	assert_eq!(manager.root().await.unwrap(), reference.root());
	assert_eq!(manager.leaf_count().await.unwrap(), 25);
}

#[tokio::test]
async fn test_replay_respects_block_range_cap() {
	let events = Arc::new(MockEvents::with_deposits(25, 130));
	let manager = manager(Arc::clone(&events), Arc::new(MockPoster::default()));

	manager.sync().await.unwrap();

	let requests = events.requests.lock().unwrap();
	// Blocks 100..=130 with a cap of 10 per request
	assert_eq!(*requests, vec![(100, 109), (110, 119), (120, 129), (130, 130)]);
}

#[tokio::test]
async fn test_resync_is_idempotent() {
	let events = Arc::new(MockEvents::with_deposits(8, 110));
	let manager = manager(Arc::clone(&events), Arc::new(MockPoster::default()));

	manager.sync().await.unwrap();
	let root = manager.root().await.unwrap();

	manager.sync().await.unwrap();
	assert_eq!(manager.root().await.unwrap(), root);
	assert_eq!(manager.leaf_count().await.unwrap(), 8);
}

#[tokio::test]
async fn test_gap_in_queue_indices_is_fatal() {
	let mut events = MockEvents::with_deposits(5, 110);
	// Drop queue index 2 from the history
	events.events.remove(2);
	let manager = manager(Arc::new(events), Arc::new(MockPoster::default()));

	let result = manager.sync().await;
	assert!(matches!(
		result,
		Err(TreeManagerError::EventGapDetected {
			expected: 2,
			found: 3
		})
	));
}

#[tokio::test]
async fn test_concurrent_syncs_single_flight() {
	let events = Arc::new(MockEvents::with_deposits(12, 115));
	let manager = Arc::new(manager(Arc::clone(&events), Arc::new(MockPoster::default())));

	let tasks: Vec<_> = (0..4)
		.map(|_| {
			let manager = Arc::clone(&manager);
			tokio::spawn(async move { manager.sync().await })
		})
		.collect();
	for task in tasks {
		task.await.unwrap().unwrap();
	}

	// Serialized syncs: later callers found the tree caught up and made no
	// further range requests
	assert_eq!(manager.leaf_count().await.unwrap(), 12);
	let requests = events.requests.lock().unwrap();
	assert_eq!(requests.len(), 2); // blocks 100..=109, 110..=115 exactly once
}

#[tokio::test]
async fn test_post_root_only_on_change() {
	let events = Arc::new(MockEvents::with_deposits(3, 105));
	let poster = Arc::new(MockPoster::default());
	let manager = manager(Arc::clone(&events), Arc::clone(&poster));

	manager.sync().await.unwrap();
	let first = manager.post_root_if_needed().await.unwrap();
	assert!(first.is_some());

	// Nothing changed: no second transaction
	let second = manager.post_root_if_needed().await.unwrap();
	assert!(second.is_none());
	assert_eq!(poster.posted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reverted_post_can_be_retried() {
	let events = Arc::new(MockEvents::with_deposits(3, 105));
	let poster = Arc::new(MockPoster::default());
	poster.fail_next.store(1, Ordering::SeqCst);
	let manager = manager(Arc::clone(&events), Arc::clone(&poster));

	manager.sync().await.unwrap();
	assert!(matches!(
		manager.post_root_if_needed().await,
		Err(TreeManagerError::PostRootReverted(_))
	));

	// The failed post did not record the root as posted
	let retry = manager.post_root_if_needed().await.unwrap();
	assert!(retry.is_some());
}

#[tokio::test]
async fn test_proof_serving_behind_sync_barrier() {
	let events = Arc::new(MockEvents::with_deposits(9, 110));
	let poster = Arc::new(MockPoster::default());
	let manager = manager(Arc::clone(&events), Arc::clone(&poster));

	// No explicit sync: proof_for runs the barrier itself
	let path = manager.proof_for(4).await.unwrap();
	let root = manager.root().await.unwrap();
	assert!(verify_proof(&root, commitment(4), &path));

	// The barrier also posted the root
	assert_eq!(poster.posted.lock().unwrap().len(), 1);

	// Out-of-range requests surface the Merkle error
	assert!(matches!(
		manager.proof_for(99).await,
		Err(TreeManagerError::Merkle(_))
	));
}

#[tokio::test]
async fn test_leaf_index_lookup() {
	let events = Arc::new(MockEvents::with_deposits(6, 110));
	let manager = manager(Arc::clone(&events), Arc::new(MockPoster::default()));

	assert_eq!(
		manager
			.leaf_index_of(&Commitment::new(commitment(3)))
			.await
			.unwrap(),
		Some(3)
	);
	assert_eq!(
		manager
			.leaf_index_of(&Commitment::new(Bn254Fr::from(5u64)))
			.await
			.unwrap(),
		None
	);
}

#[tokio::test]
async fn test_registry_hands_out_per_chain_managers() {
	let events = Arc::new(MockEvents::with_deposits(2, 105));
	let poster = Arc::new(MockPoster::default());
	let registry = TreeRegistry::new(events, poster);

	registry.register(CHAIN_ID, 100, 10);
	let manager = registry.get(CHAIN_ID).unwrap();
	manager.sync().await.unwrap();
	assert_eq!(manager.leaf_count().await.unwrap(), 2);

	assert!(matches!(
		registry.get(1),
		Err(TreeManagerError::UnknownChain(1))
	));
}
