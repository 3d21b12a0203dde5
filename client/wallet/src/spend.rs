//! # Spend Coordinator
//!
//! Drives every spend end to end:
//!
//! ```text
//! IDLE → SELECTING_INPUTS → PROVING_COMPLIANCE → GENERATING_PROOF
//!   → SUBMITTING → CONFIRMING → SAVING_OUTPUT → DONE
//!   (any step) → ERROR (terminal until retried from IDLE)
//! ```
//!
//! One spend is in flight per wallet at a time. Submission happens before
//! persistence; the store's mark-spent-and-save write is a single atomic
//! transaction, so a spend is never half-applied locally.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use dp_circuit_inputs::{
	build_deposit, build_split, build_transfer, build_withdraw, decompose, denominations_for,
	CircuitId, SPLIT_OUTPUTS,
};
use dp_zk_core::{
	AssetId, ComplianceStatus, EthAddress, Note, NoteRecord, OwnerPubkey, SessionKeys,
};

use crate::compliance::ComplianceOrchestrator;
use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::ports::{ChainReader, NoteStore, ProofArtifact, ProofBackend, RelayerClient};
use crate::retry::with_retry;

/// Spend state machine phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendPhase {
	Idle,
	SelectingInputs,
	ProvingCompliance,
	GeneratingProof,
	Submitting,
	Confirming,
	SavingOutput,
	Done,
	Error,
}

/// Result of a completed spend.
#[derive(Clone, Debug)]
pub struct SpendReceipt {
	pub tx_hash: String,
	/// The output notes persisted for this wallet (change, recipient chunks)
	pub outputs: Vec<NoteRecord>,
}

/// Top-level orchestration of deposits and spends for one wallet.
pub struct SpendCoordinator {
	store: Arc<dyn NoteStore>,
	relayer: Arc<dyn RelayerClient>,
	prover: Arc<dyn ProofBackend>,
	compliance: ComplianceOrchestrator,
	config: ChainConfig,
	wallet: String,
	keys: SessionKeys,
	phase: Mutex<SpendPhase>,
	/// At most one in-flight spend per wallet
	spend_lock: tokio::sync::Mutex<()>,
}

impl SpendCoordinator {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		store: Arc<dyn NoteStore>,
		relayer: Arc<dyn RelayerClient>,
		chain: Arc<dyn ChainReader>,
		prover: Arc<dyn ProofBackend>,
		config: ChainConfig,
		wallet: String,
		keys: SessionKeys,
	) -> Self {
		let compliance = ComplianceOrchestrator::new(
			Arc::clone(&relayer),
			chain,
			Arc::clone(&prover),
			config.clone(),
		);
		Self {
			store,
			relayer,
			prover,
			compliance,
			config,
			wallet,
			keys,
			phase: Mutex::new(SpendPhase::Idle),
			spend_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Current phase of the spend state machine.
	pub fn phase(&self) -> SpendPhase {
		*self.phase.lock()
	}

	fn set_phase(&self, phase: SpendPhase) {
		log::debug!("spend phase: {phase:?}");
		*self.phase.lock() = phase;
	}

	/// The compliance gate, for callers that want standalone proving.
	pub fn compliance(&self) -> &ComplianceOrchestrator {
		&self.compliance
	}

	/// Unspent notes for this wallet on the configured chain.
	pub async fn unspent_notes(&self) -> Result<Vec<NoteRecord>, WalletError> {
		self.store
			.unspent_notes(&self.wallet, self.config.chain_id)
			.await
	}

	// ------------------------------------------------------------------
	// Deposit
	// ------------------------------------------------------------------

	/// Create and persist a pending deposit note, returning it together
	/// with the deposit proof the external wallet submits on-chain.
	pub async fn prepare_deposit(
		&self,
		amount: u128,
		asset: AssetId,
	) -> Result<(NoteRecord, ProofArtifact), WalletError> {
		let note = Note::new(
			self.keys.owner_pubkey(),
			amount,
			asset,
			self.config.chain_id,
		);
		let record = NoteRecord::pending(note, now_ms());
		self.store.save_pending(&self.wallet, &record).await?;

		let inputs = build_deposit(&note);
		let artifact = self
			.prover
			.prove(CircuitId::Deposit, &inputs.to_prover_inputs())
			.await?;
		if !self.prover.verify(CircuitId::Deposit, &artifact).await? {
			return Err(WalletError::ProofRejected(
				"deposit proof failed local verification".to_string(),
			));
		}

		Ok((record, artifact))
	}

	/// Poll the relayer until the deposit is queued into the tree, then
	/// record its leaf index. Bounded at `confirm_poll_attempts` polls.
	pub async fn await_deposit_confirmation(
		&self,
		record: &NoteRecord,
	) -> Result<u64, WalletError> {
		let interval = Duration::from_millis(self.config.confirm_poll_interval_ms);

		for attempt in 1..=self.config.confirm_poll_attempts {
			let status = with_retry("deposit_status", || {
				self.relayer
					.deposit_status(&record.commitment, self.config.chain_id)
			})
			.await?;

			if status.confirmed {
				let leaf_index = status.leaf_index.ok_or_else(|| {
					WalletError::RelayerRejected(
						"confirmed deposit without leaf index".to_string(),
					)
				})?;
				self.store.update_leaf_index(&record.id(), leaf_index).await?;
				log::info!("deposit {} confirmed at leaf {leaf_index}", record.id());
				return Ok(leaf_index);
			}

			log::debug!(
				"deposit not confirmed yet (attempt {attempt}/{})",
				self.config.confirm_poll_attempts
			);
			tokio::time::sleep(interval).await;
		}

		Err(WalletError::ConfirmationTimeout(format!(
			"deposit {} not confirmed after {} polls",
			record.id(),
			self.config.confirm_poll_attempts
		)))
	}

	// ------------------------------------------------------------------
	// Spends
	// ------------------------------------------------------------------

	/// Withdraw `amount` from `input` to an external `recipient` address.
	pub async fn withdraw(
		&self,
		input: &NoteRecord,
		amount: u128,
		recipient: &EthAddress,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		let _guard = self.spend_lock.lock().await;
		let result = self.withdraw_inner(input, amount, recipient, token).await;
		self.finish(&result);
		result
	}

	async fn withdraw_inner(
		&self,
		input: &NoteRecord,
		amount: u128,
		recipient: &EthAddress,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		self.select_input(input)?;
		self.run_compliance_gate(input).await?;

		let path = with_retry("merkle_proof", || {
			self.relayer
				.merkle_proof(input.leaf_index as u64, self.config.chain_id)
		})
		.await?;

		self.set_phase(SpendPhase::GeneratingProof);
		let built = build_withdraw(input, amount, recipient, &path, &self.keys)?;
		let artifact = self.prove_and_check(CircuitId::Transact, &built.to_prover_inputs()).await?;

		self.set_phase(SpendPhase::Submitting);
		let receipt = with_retry("submit_withdrawal", || {
			self.relayer
				.submit_withdrawal(&artifact, self.config.chain_id, token)
		})
		.await?;

		self.set_phase(SpendPhase::Confirming);
		log::info!(
			"withdrawal accepted in tx {} (block {})",
			receipt.tx_hash,
			receipt.block_number
		);

		let outputs = self.persist_outputs(input, &built.outputs).await?;
		Ok(SpendReceipt {
			tx_hash: receipt.tx_hash,
			outputs,
		})
	}

	/// Transfer `amount` from `input` to another pool participant.
	pub async fn transfer(
		&self,
		input: &NoteRecord,
		recipient_owner: OwnerPubkey,
		amount: u128,
	) -> Result<SpendReceipt, WalletError> {
		let _guard = self.spend_lock.lock().await;
		let result = self.transfer_inner(input, recipient_owner, amount).await;
		self.finish(&result);
		result
	}

	async fn transfer_inner(
		&self,
		input: &NoteRecord,
		recipient_owner: OwnerPubkey,
		amount: u128,
	) -> Result<SpendReceipt, WalletError> {
		self.select_input(input)?;
		self.run_compliance_gate(input).await?;

		let path = with_retry("merkle_proof", || {
			self.relayer
				.merkle_proof(input.leaf_index as u64, self.config.chain_id)
		})
		.await?;

		self.set_phase(SpendPhase::GeneratingProof);
		let built = build_transfer(input, recipient_owner, amount, &path, &self.keys)?;
		let artifact = self.prove_and_check(CircuitId::Transact, &built.to_prover_inputs()).await?;

		self.set_phase(SpendPhase::Submitting);
		let receipt = with_retry("submit_transfer", || {
			self.relayer.submit_transfer(&artifact, self.config.chain_id)
		})
		.await?;
		if !receipt.success {
			return Err(WalletError::RelayerRejected(format!(
				"transfer not accepted (tx {})",
				receipt.tx_hash
			)));
		}

		self.set_phase(SpendPhase::Confirming);
		let outputs = self.persist_outputs(input, &built.outputs).await?;
		Ok(SpendReceipt {
			tx_hash: receipt.tx_hash,
			outputs,
		})
	}

	/// Split `input` into `chunks` (optionally owned by `recipient_owner`),
	/// keeping any remainder as change.
	pub async fn split(
		&self,
		input: &NoteRecord,
		chunks: &[u128],
		recipient_owner: Option<OwnerPubkey>,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		let _guard = self.spend_lock.lock().await;
		let result = self
			.split_inner(input, chunks, recipient_owner, token)
			.await;
		self.finish(&result);
		result
	}

	async fn split_inner(
		&self,
		input: &NoteRecord,
		chunks: &[u128],
		recipient_owner: Option<OwnerPubkey>,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		self.select_input(input)?;
		self.run_compliance_gate(input).await?;

		let path = with_retry("merkle_proof", || {
			self.relayer
				.merkle_proof(input.leaf_index as u64, self.config.chain_id)
		})
		.await?;

		self.set_phase(SpendPhase::GeneratingProof);
		let built = build_split(input, chunks, recipient_owner, &path, &self.keys)?;
		let artifact = self.prove_and_check(CircuitId::Split, &built.to_prover_inputs()).await?;

		self.set_phase(SpendPhase::Submitting);
		let receipt = with_retry("submit_split_withdrawal", || {
			self.relayer
				.submit_split_withdrawal(&artifact, self.config.chain_id, token)
		})
		.await?;

		self.set_phase(SpendPhase::Confirming);
		let outputs = self.persist_outputs(input, &built.outputs).await?;
		Ok(SpendReceipt {
			tx_hash: receipt.tx_hash,
			outputs,
		})
	}

	/// Denomination-based swap: decompose `amount` into standard chunks for
	/// `token`, split the input accordingly, and submit as a batch swap.
	pub async fn swap_denominated(
		&self,
		input: &NoteRecord,
		amount: u128,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		let _guard = self.spend_lock.lock().await;
		let result = self.swap_inner(input, amount, token).await;
		self.finish(&result);
		result
	}

	async fn swap_inner(
		&self,
		input: &NoteRecord,
		amount: u128,
		token: &str,
	) -> Result<SpendReceipt, WalletError> {
		self.select_input(input)?;

		// Leave an output slot for change when the swap is partial
		let max_chunks = SPLIT_OUTPUTS - usize::from(amount < input.note.amount);
		let denominations = denominations_for(token)?;
		let chunks = decompose(amount, denominations, Some(max_chunks));
		log::debug!("swap decomposed into {} chunks", chunks.len());

		self.run_compliance_gate(input).await?;

		let path = with_retry("merkle_proof", || {
			self.relayer
				.merkle_proof(input.leaf_index as u64, self.config.chain_id)
		})
		.await?;

		self.set_phase(SpendPhase::GeneratingProof);
		let built = build_split(input, &chunks, None, &path, &self.keys)?;
		let artifact = self.prove_and_check(CircuitId::Split, &built.to_prover_inputs()).await?;

		self.set_phase(SpendPhase::Submitting);
		let outcome = with_retry("submit_batch_swap", || {
			self.relayer
				.submit_batch_swap(std::slice::from_ref(&artifact), self.config.chain_id)
		})
		.await?;
		if outcome.succeeded == 0 {
			return Err(WalletError::RelayerRejected(format!(
				"batch swap rejected: {}",
				outcome.errors.join("; ")
			)));
		}

		self.set_phase(SpendPhase::Confirming);
		let tx_hash = outcome
			.results
			.first()
			.map(|r| r.tx_hash.clone())
			.unwrap_or_default();
		let outputs = self.persist_outputs(input, &built.outputs).await?;
		Ok(SpendReceipt { tx_hash, outputs })
	}

	// ------------------------------------------------------------------
	// Shared steps
	// ------------------------------------------------------------------

	fn select_input(&self, input: &NoteRecord) -> Result<(), WalletError> {
		self.set_phase(SpendPhase::SelectingInputs);
		if input.spent {
			return Err(WalletError::NullifierAlreadySpent);
		}
		if !input.is_confirmed() {
			return Err(WalletError::Input(
				dp_circuit_inputs::InputError::UnconfirmedInput,
			));
		}
		Ok(())
	}

	async fn run_compliance_gate(&self, input: &NoteRecord) -> Result<(), WalletError> {
		self.set_phase(SpendPhase::ProvingCompliance);
		self.compliance
			.ensure_proved(
				std::slice::from_ref(input),
				&self.keys.nullifier_key,
				self.config.chain_id,
				None,
				None,
			)
			.await
	}

	async fn prove_and_check(
		&self,
		circuit: CircuitId,
		inputs: &serde_json::Value,
	) -> Result<ProofArtifact, WalletError> {
		let artifact = self.prover.prove(circuit, inputs).await?;
		if !self.prover.verify(circuit, &artifact).await? {
			return Err(WalletError::ProofRejected(format!(
				"{} proof failed local verification",
				circuit.as_str()
			)));
		}
		Ok(artifact)
	}

	/// Atomically mark the input spent and persist all non-dummy outputs.
	///
	/// Outputs of an already-gated spend inherit compliance.
	async fn persist_outputs(
		&self,
		input: &NoteRecord,
		outputs: &[Note],
	) -> Result<Vec<NoteRecord>, WalletError> {
		self.set_phase(SpendPhase::SavingOutput);

		let records: Vec<NoteRecord> = outputs
			.iter()
			.filter(|note| !note.is_dummy())
			.map(|note| {
				let mut record = NoteRecord::pending(*note, now_ms());
				record.compliance = ComplianceStatus::Inherited;
				record
			})
			.collect();

		self.store
			.mark_spent_and_save_outputs(&self.wallet, &input.id(), &records)
			.await?;
		Ok(records)
	}

	fn finish<T>(&self, result: &Result<T, WalletError>) {
		match result {
			Ok(_) => self.set_phase(SpendPhase::Done),
			Err(error) => {
				log::warn!("spend failed: {error}");
				self.set_phase(SpendPhase::Error);
			}
		}
	}
}

fn now_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or(0)
}
