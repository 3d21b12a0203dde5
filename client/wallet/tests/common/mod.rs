//! Shared mock collaborators for wallet orchestration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dc_wallet::{
	BatchOutcome, ChainConfig, ChainReader, ComplianceReceipt, ComplianceWitnessResponse,
	DepositStatus, NoteStore, ProofArtifact, ProofBackend, RelayerClient, TransferReceipt,
	WalletError, WithdrawalReceipt,
};
use dp_circuit_inputs::CircuitId;
use dp_merkle::incremental::MerklePath;
use dp_merkle::TREE_DEPTH;
use dp_zk_core::{Bn254Fr, ChainId, Commitment, EthAddress, NoteRecord, Nullifier};

pub const CHAIN_ID: ChainId = 11155111;
pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

/// In-memory note store with an all-or-nothing spend write.
#[derive(Default)]
pub struct MockStore {
	pub notes: Mutex<HashMap<String, NoteRecord>>,
	pub reject_writes: AtomicBool,
}

impl MockStore {
	pub fn note(&self, id: &str) -> Option<NoteRecord> {
		self.notes.lock().unwrap().get(id).cloned()
	}

	pub fn insert(&self, record: &NoteRecord) {
		self.notes
			.lock()
			.unwrap()
			.insert(record.id(), record.clone());
	}
}

#[async_trait]
impl NoteStore for MockStore {
	async fn save_pending(&self, _wallet: &str, note: &NoteRecord) -> Result<(), WalletError> {
		self.insert(note);
		Ok(())
	}

	async fn mark_spent_and_save_outputs(
		&self,
		_wallet: &str,
		input_id: &str,
		outputs: &[NoteRecord],
	) -> Result<(), WalletError> {
		if self.reject_writes.load(Ordering::SeqCst) {
			return Err(WalletError::StoreRejected("write refused".to_string()));
		}
		let mut notes = self.notes.lock().unwrap();
		let input = notes
			.get_mut(input_id)
			.ok_or_else(|| WalletError::StoreRejected("unknown input".to_string()))?;
		if input.spent {
			return Err(WalletError::StoreRejected("input already spent".to_string()));
		}
		// Single transaction: both effects under one lock
		input.spent = true;
		for output in outputs {
			notes.insert(output.id(), output.clone());
		}
		Ok(())
	}

	async fn unspent_notes(
		&self,
		_wallet: &str,
		chain_id: ChainId,
	) -> Result<Vec<NoteRecord>, WalletError> {
		Ok(self
			.notes
			.lock()
			.unwrap()
			.values()
			.filter(|n| !n.spent && n.note.chain_id == chain_id)
			.cloned()
			.collect())
	}

	async fn update_leaf_index(&self, id: &str, leaf_index: u64) -> Result<(), WalletError> {
		let mut notes = self.notes.lock().unwrap();
		if let Some(record) = notes.get_mut(id) {
			record.leaf_index = leaf_index as i64;
		}
		Ok(())
	}

	async fn delete_all(&self, _wallet: &str) -> Result<(), WalletError> {
		self.notes.lock().unwrap().clear();
		Ok(())
	}
}

/// Scripted relayer. Tracks submissions and enforces nullifier uniqueness
/// the way the chain does.
pub struct MockRelayer {
	pub spent_nullifiers: Arc<Mutex<HashSet<String>>>,
	pub verified_nullifiers: Arc<Mutex<HashSet<String>>>,
	pub witness_calls: AtomicU32,
	pub submitted_compliance: AtomicU32,
	pub submitted_withdrawals: AtomicU32,
	pub submitted_transfers: AtomicU32,
	pub submitted_batch_swaps: AtomicU32,
	/// Remaining transient failures to inject into merkle_proof
	pub flaky_merkle_proofs: AtomicU32,
	/// Polls reporting unconfirmed before a deposit confirms
	pub deposit_confirm_after: AtomicU32,
	pub fail_witness: AtomicBool,
}

impl MockRelayer {
	pub fn new(verified_nullifiers: Arc<Mutex<HashSet<String>>>) -> Self {
		Self {
			spent_nullifiers: Arc::new(Mutex::new(HashSet::new())),
			verified_nullifiers,
			witness_calls: AtomicU32::new(0),
			submitted_compliance: AtomicU32::new(0),
			submitted_withdrawals: AtomicU32::new(0),
			submitted_transfers: AtomicU32::new(0),
			submitted_batch_swaps: AtomicU32::new(0),
			flaky_merkle_proofs: AtomicU32::new(0),
			deposit_confirm_after: AtomicU32::new(0),
			fail_witness: AtomicBool::new(false),
		}
	}

	fn record_nullifier(&self, artifact: &ProofArtifact) -> Result<(), WalletError> {
		// Public signal 1 is the slot-0 nullifier for spend circuits
		let Some(nullifier) = artifact.public_signals.get(1) else {
			return Ok(());
		};
		let mut spent = self.spent_nullifiers.lock().unwrap();
		if !spent.insert(nullifier.clone()) {
			return Err(WalletError::NullifierAlreadySpent);
		}
		Ok(())
	}
}

#[async_trait]
impl RelayerClient for MockRelayer {
	async fn tree_root(&self, _chain_id: ChainId) -> Result<Bn254Fr, WalletError> {
		Ok(Bn254Fr::from(0u64))
	}

	async fn merkle_proof(
		&self,
		_leaf_index: u64,
		_chain_id: ChainId,
	) -> Result<MerklePath, WalletError> {
		let remaining = self.flaky_merkle_proofs.load(Ordering::SeqCst);
		if remaining > 0 {
			self.flaky_merkle_proofs.store(remaining - 1, Ordering::SeqCst);
			return Err(WalletError::RelayerTransient("503".to_string()));
		}
		Ok(MerklePath::zero())
	}

	async fn submit_withdrawal(
		&self,
		proof: &ProofArtifact,
		_chain_id: ChainId,
		_token: &str,
	) -> Result<WithdrawalReceipt, WalletError> {
		self.record_nullifier(proof)?;
		self.submitted_withdrawals.fetch_add(1, Ordering::SeqCst);
		Ok(WithdrawalReceipt {
			tx_hash: "0xwithdraw".to_string(),
			block_number: 1234,
			gas_used: 21_000,
			fee: "100".to_string(),
		})
	}

	async fn submit_split_withdrawal(
		&self,
		proof: &ProofArtifact,
		_chain_id: ChainId,
		_token: &str,
	) -> Result<WithdrawalReceipt, WalletError> {
		self.record_nullifier(proof)?;
		Ok(WithdrawalReceipt {
			tx_hash: "0xsplit".to_string(),
			block_number: 1235,
			gas_used: 42_000,
			fee: "150".to_string(),
		})
	}

	async fn submit_transfer(
		&self,
		proof: &ProofArtifact,
		_chain_id: ChainId,
	) -> Result<TransferReceipt, WalletError> {
		self.record_nullifier(proof)?;
		self.submitted_transfers.fetch_add(1, Ordering::SeqCst);
		Ok(TransferReceipt {
			success: true,
			tx_hash: "0xtransfer".to_string(),
		})
	}

	async fn submit_batch_withdrawal(
		&self,
		proofs: &[ProofArtifact],
		_chain_id: ChainId,
	) -> Result<BatchOutcome, WalletError> {
		Ok(BatchOutcome {
			results: vec![],
			errors: vec![],
			total: proofs.len(),
			succeeded: proofs.len(),
		})
	}

	async fn submit_batch_swap(
		&self,
		proofs: &[ProofArtifact],
		_chain_id: ChainId,
	) -> Result<BatchOutcome, WalletError> {
		for proof in proofs {
			self.record_nullifier(proof)?;
		}
		self.submitted_batch_swaps.fetch_add(1, Ordering::SeqCst);
		Ok(BatchOutcome {
			results: vec![WithdrawalReceipt {
				tx_hash: "0xswap".to_string(),
				block_number: 1236,
				gas_used: 60_000,
				fee: "200".to_string(),
			}],
			errors: vec![],
			total: proofs.len(),
			succeeded: proofs.len(),
		})
	}

	async fn deposit_status(
		&self,
		_commitment: &Commitment,
		_chain_id: ChainId,
	) -> Result<DepositStatus, WalletError> {
		let remaining = self.deposit_confirm_after.load(Ordering::SeqCst);
		if remaining > 0 {
			self.deposit_confirm_after.store(remaining - 1, Ordering::SeqCst);
			return Ok(DepositStatus {
				confirmed: false,
				leaf_index: None,
			});
		}
		Ok(DepositStatus {
			confirmed: true,
			leaf_index: Some(7),
		})
	}

	async fn compliance_witness(
		&self,
		_commitment: &Commitment,
		_chain_id: ChainId,
	) -> Result<ComplianceWitnessResponse, WalletError> {
		self.witness_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_witness.load(Ordering::SeqCst) {
			return Err(WalletError::RelayerRejected("screening down".to_string()));
		}
		// Empty exclusion set: the path terminates immediately
		Ok(ComplianceWitnessResponse {
			exclusion_root: "0".to_string(),
			smt_siblings: vec!["0".to_string(); TREE_DEPTH],
			smt_old_key: "0".to_string(),
			smt_old_value: "0".to_string(),
			smt_is_old0: "1".to_string(),
		})
	}

	async fn submit_compliance_proof(
		&self,
		_proof: &ProofArtifact,
		_exclusion_root: &Bn254Fr,
		nullifier: &Nullifier,
		_chain_id: ChainId,
	) -> Result<ComplianceReceipt, WalletError> {
		self.submitted_compliance.fetch_add(1, Ordering::SeqCst);
		// On-chain acceptance marks the nullifier verified
		self.verified_nullifiers
			.lock()
			.unwrap()
			.insert(dp_zk_core::crypto::field::to_bytes32_hex(&nullifier.inner()));
		Ok(ComplianceReceipt {
			tx_hash: "0xcompliance".to_string(),
			verified: true,
		})
	}
}

/// Chain reader sharing its verified-nullifier set with the mock relayer.
pub struct MockChain {
	pub verifier: Option<EthAddress>,
	pub verified_nullifiers: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl ChainReader for MockChain {
	async fn compliance_verifier(
		&self,
		_chain_id: ChainId,
	) -> Result<Option<EthAddress>, WalletError> {
		Ok(self.verifier)
	}

	async fn is_compliance_verified(
		&self,
		nullifier: &Nullifier,
		_chain_id: ChainId,
	) -> Result<bool, WalletError> {
		Ok(self
			.verified_nullifiers
			.lock()
			.unwrap()
			.contains(&dp_zk_core::crypto::field::to_bytes32_hex(&nullifier.inner())))
	}
}

/// Prover that echoes the witness's public signals back as the artifact.
pub struct MockProver {
	pub prove_calls: AtomicU32,
	pub verify_ok: AtomicBool,
}

impl Default for MockProver {
	fn default() -> Self {
		Self {
			prove_calls: AtomicU32::new(0),
			verify_ok: AtomicBool::new(true),
		}
	}
}

#[async_trait]
impl ProofBackend for MockProver {
	async fn prove(
		&self,
		circuit: CircuitId,
		inputs: &serde_json::Value,
	) -> Result<ProofArtifact, WalletError> {
		self.prove_calls.fetch_add(1, Ordering::SeqCst);

		// Mirror the real public-signal layout closely enough for the
		// relayer mock: [merkleRoot, nullifier0, nullifier1, ...]
		let mut public_signals = Vec::new();
		match circuit {
			CircuitId::Compliance => {
				public_signals.push(string_at(inputs, "exclusionRoot"));
				public_signals.push(string_at(inputs, "nullifier"));
			}
			_ => {
				public_signals.push(string_at(inputs, "merkleRoot"));
				for nullifier in inputs["inNullifier"].as_array().into_iter().flatten() {
					public_signals.push(nullifier.as_str().unwrap_or_default().to_string());
				}
			}
		}

		Ok(ProofArtifact {
			proof: vec![0xaa; 32],
			public_signals,
		})
	}

	async fn verify(
		&self,
		_circuit: CircuitId,
		_artifact: &ProofArtifact,
	) -> Result<bool, WalletError> {
		Ok(self.verify_ok.load(Ordering::SeqCst))
	}
}

fn string_at(inputs: &serde_json::Value, key: &str) -> String {
	inputs[key].as_str().unwrap_or_default().to_string()
}

/// A full mock environment wired together.
pub struct TestEnv {
	pub store: Arc<MockStore>,
	pub relayer: Arc<MockRelayer>,
	pub chain: Arc<MockChain>,
	pub prover: Arc<MockProver>,
	pub config: ChainConfig,
}

impl TestEnv {
	/// Environment with the compliance gate enabled.
	pub fn with_gate() -> Self {
		let verified = Arc::new(Mutex::new(HashSet::new()));
		let mut config = ChainConfig::new(CHAIN_ID);
		config.compliance_verifier =
			Some("0x00000000000000000000000000000000000000aa".to_string());
		Self {
			store: Arc::new(MockStore::default()),
			relayer: Arc::new(MockRelayer::new(Arc::clone(&verified))),
			chain: Arc::new(MockChain {
				verifier: Some([0xaau8; 20]),
				verified_nullifiers: verified,
			}),
			prover: Arc::new(MockProver::default()),
			config,
		}
	}

	/// Environment with no compliance verifier configured.
	pub fn without_gate() -> Self {
		let mut env = Self::with_gate();
		env.config.compliance_verifier = None;
		env
	}
}
