//! # Compliance Gate
//!
//! Before a note may be spent, a compliance proof (non-membership of the
//! note's commitment in the exclusion set) must be accepted on-chain. This
//! orchestrator runs that gate over a batch of input notes, skipping
//! everything already proven and proving the rest sequentially:
//!
//! ```text
//! fetch witness → build inputs → prove → local verify → submit
//! ```
//!
//! Overall status progression:
//! `Idle → FetchingWitness → GeneratingProof → Submitting → Done | Error`.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use dp_circuit_inputs::{build_compliance, CircuitId};
use dp_zk_core::crypto::field::to_bytes32_hex;
use dp_zk_core::{ChainId, ComplianceStatus as NoteCompliance, NoteRecord, NullifierKey};

use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::ports::{ChainReader, ProofBackend, RelayerClient};
use crate::retry::with_retry;

/// Per-note progress events, delivered with the note's commitment hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplianceStage {
	FetchingWitness,
	GeneratingProof,
	Submitting,
}

/// Overall orchestrator status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplianceStatus {
	Idle,
	FetchingWitness,
	GeneratingProof,
	Submitting,
	Done,
	Error,
}

/// Callback for per-note stage events: `(stage, commitment_hex)`.
pub type StatusCallback = dyn Fn(ComplianceStage, &str) + Send + Sync;

/// Callback fired after on-chain acceptance: `(commitment_hex, tx_hash)`.
pub type VerifiedCallback = dyn Fn(&str, &str) + Send + Sync;

/// Batched compliance-proof gate over input notes.
pub struct ComplianceOrchestrator {
	relayer: Arc<dyn RelayerClient>,
	chain: Arc<dyn ChainReader>,
	prover: Arc<dyn ProofBackend>,
	config: ChainConfig,
	status: Mutex<ComplianceStatus>,
	/// Nullifiers currently being proven, across concurrent invocations
	in_flight: Mutex<HashSet<String>>,
}

impl ComplianceOrchestrator {
	pub fn new(
		relayer: Arc<dyn RelayerClient>,
		chain: Arc<dyn ChainReader>,
		prover: Arc<dyn ProofBackend>,
		config: ChainConfig,
	) -> Self {
		Self {
			relayer,
			chain,
			prover,
			config,
			status: Mutex::new(ComplianceStatus::Idle),
			in_flight: Mutex::new(HashSet::new()),
		}
	}

	/// Current overall status.
	pub fn status(&self) -> ComplianceStatus {
		*self.status.lock()
	}

	fn set_status(&self, status: ComplianceStatus) {
		*self.status.lock() = status;
	}

	/// Ensure every note in `notes` has an accepted compliance proof.
	///
	/// Skip rules, in order: gate disabled in config; live verifier unset;
	/// note unconfirmed (`leaf_index < 0`); local status already
	/// verified/inherited; zero nullifier; nullifier already verified
	/// on-chain; proof already in flight elsewhere.
	///
	/// Notes are processed sequentially in input order. The first failure
	/// aborts the whole operation; proofs already accepted on-chain stay
	/// accepted.
	pub async fn ensure_proved(
		&self,
		notes: &[NoteRecord],
		nullifier_key: &NullifierKey,
		chain_id: ChainId,
		on_status: Option<&StatusCallback>,
		on_verified: Option<&VerifiedCallback>,
	) -> Result<(), WalletError> {
		if self.config.compliance_verifier_address()?.is_none() {
			log::debug!("compliance gate disabled for chain {chain_id}");
			return Ok(());
		}

		let live_verifier = with_retry("compliance_verifier", || {
			self.chain.compliance_verifier(chain_id)
		})
		.await?;
		if live_verifier.is_none() {
			log::debug!("pool reports no compliance verifier on chain {chain_id}");
			return Ok(());
		}

		let result = self
			.run_gate(notes, nullifier_key, chain_id, on_status, on_verified)
			.await;

		match &result {
			Ok(()) => self.set_status(ComplianceStatus::Done),
			Err(error) => {
				log::warn!("compliance gate failed: {error}");
				self.set_status(ComplianceStatus::Error);
			}
		}
		result
	}

	async fn run_gate(
		&self,
		notes: &[NoteRecord],
		nullifier_key: &NullifierKey,
		chain_id: ChainId,
		on_status: Option<&StatusCallback>,
		on_verified: Option<&VerifiedCallback>,
	) -> Result<(), WalletError> {
		for record in notes {
			if !record.is_confirmed() {
				continue;
			}
			if matches!(
				record.compliance,
				NoteCompliance::Verified | NoteCompliance::Inherited
			) {
				continue;
			}

			let Some(nullifier) = record.nullifier(nullifier_key) else {
				continue;
			};
			if nullifier.is_zero() {
				continue;
			}

			// Guard before the on-chain check: a concurrent invocation that
			// already holds the guard will submit, and the check after it
			// releases would race otherwise
			let nullifier_hex = to_bytes32_hex(&nullifier.inner());
			if !self.in_flight.lock().insert(nullifier_hex.clone()) {
				log::debug!("compliance proof for {nullifier_hex} already in flight");
				continue;
			}

			let outcome = self
				.gate_note(record, &nullifier, nullifier_key, chain_id, on_status, on_verified)
				.await;
			self.in_flight.lock().remove(&nullifier_hex);
			outcome?;
		}
		Ok(())
	}

	/// One note under the in-flight guard: on-chain recheck, then the full
	/// proof lifecycle if still needed.
	async fn gate_note(
		&self,
		record: &NoteRecord,
		nullifier: &dp_zk_core::Nullifier,
		nullifier_key: &NullifierKey,
		chain_id: ChainId,
		on_status: Option<&StatusCallback>,
		on_verified: Option<&VerifiedCallback>,
	) -> Result<(), WalletError> {
		if with_retry("is_compliance_verified", || {
			self.chain.is_compliance_verified(nullifier, chain_id)
		})
		.await?
		{
			log::debug!("nullifier already compliance-verified on-chain");
			return Ok(());
		}
		self.prove_single(record, nullifier_key, chain_id, on_status, on_verified)
			.await
	}

	/// Full lifecycle for one note: witness → inputs → proof → verify → submit.
	async fn prove_single(
		&self,
		record: &NoteRecord,
		nullifier_key: &NullifierKey,
		chain_id: ChainId,
		on_status: Option<&StatusCallback>,
		on_verified: Option<&VerifiedCallback>,
	) -> Result<(), WalletError> {
		let commitment_hex = record.id();

		self.set_status(ComplianceStatus::FetchingWitness);
		if let Some(callback) = on_status {
			callback(ComplianceStage::FetchingWitness, &commitment_hex);
		}
		let witness = with_retry("compliance_witness", || {
			self.relayer.compliance_witness(&record.commitment, chain_id)
		})
		.await?
		.to_witness()?;

		let inputs = build_compliance(record, nullifier_key, &witness)?;

		self.set_status(ComplianceStatus::GeneratingProof);
		if let Some(callback) = on_status {
			callback(ComplianceStage::GeneratingProof, &commitment_hex);
		}
		let artifact = self
			.prover
			.prove(CircuitId::Compliance, &inputs.to_prover_inputs())
			.await?;

		if !self.prover.verify(CircuitId::Compliance, &artifact).await? {
			return Err(WalletError::ProofRejected(
				"compliance proof failed local verification".to_string(),
			));
		}

		self.set_status(ComplianceStatus::Submitting);
		if let Some(callback) = on_status {
			callback(ComplianceStage::Submitting, &commitment_hex);
		}
		let receipt = with_retry("submit_compliance_proof", || {
			self.relayer.submit_compliance_proof(
				&artifact,
				&inputs.exclusion_root,
				&inputs.nullifier,
				chain_id,
			)
		})
		.await?;

		log::info!(
			"compliance proof accepted for {commitment_hex} in tx {}",
			receipt.tx_hash
		);
		if let Some(callback) = on_verified {
			callback(&commitment_hex, &receipt.tx_hash);
		}
		Ok(())
	}
}
