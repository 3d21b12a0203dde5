//! Integration tests for the compliance gate

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use common::{TestEnv, CHAIN_ID, ONE_ETH};
use dc_wallet::{ComplianceOrchestrator, ComplianceStage, ComplianceStatus, WalletError};
use dp_zk_core::{derive_keys, Bn254Fr, ComplianceStatus as NoteCompliance, Note, NoteRecord, SessionKeys};

fn keys() -> SessionKeys {
	derive_keys("0xgate", "123456").unwrap()
}

fn note_with(keys: &SessionKeys, leaf_index: i64, compliance: NoteCompliance) -> NoteRecord {
	let note = Note::new(keys.owner_pubkey(), ONE_ETH, Bn254Fr::from(0u64), CHAIN_ID);
	let mut record = NoteRecord::pending(note, 0);
	record.leaf_index = leaf_index;
	record.compliance = compliance;
	record
}

fn orchestrator(env: &TestEnv) -> ComplianceOrchestrator {
	ComplianceOrchestrator::new(
		env.relayer.clone(),
		env.chain.clone(),
		env.prover.clone(),
		env.config.clone(),
	)
}

#[tokio::test]
async fn test_only_unverified_notes_are_proven() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let notes = vec![
		note_with(&keys, 0, NoteCompliance::Verified),
		note_with(&keys, 1, NoteCompliance::Unverified),
		note_with(&keys, 2, NoteCompliance::Inherited),
	];

	let gate = orchestrator(&env);
	gate.ensure_proved(&notes, &keys.nullifier_key, CHAIN_ID, None, None)
		.await
		.unwrap();

	// Exactly one proof, for the unverified note
	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 1);
	assert_eq!(env.relayer.submitted_compliance.load(Ordering::SeqCst), 1);
	assert_eq!(gate.status(), ComplianceStatus::Done);
}

#[tokio::test]
async fn test_pending_notes_are_never_proven() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let notes = vec![note_with(&keys, -1, NoteCompliance::Unverified)];

	orchestrator(&env)
		.ensure_proved(&notes, &keys.nullifier_key, CHAIN_ID, None, None)
		.await
		.unwrap();

	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 0);
	assert_eq!(env.relayer.witness_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disabled_gate_short_circuits() {
	let env = TestEnv::without_gate();
	let keys = keys();
	let notes = vec![note_with(&keys, 0, NoteCompliance::Unverified)];

	orchestrator(&env)
		.ensure_proved(&notes, &keys.nullifier_key, CHAIN_ID, None, None)
		.await
		.unwrap();

	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_onchain_verified_nullifier_is_skipped() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let record = note_with(&keys, 3, NoteCompliance::Unverified);

	// Pre-mark the nullifier as verified on-chain
	let nullifier = record.nullifier(&keys.nullifier_key).unwrap();
	env.chain.verified_nullifiers.lock().unwrap().insert(
		dp_zk_core::crypto::field::to_bytes32_hex(&nullifier.inner()),
	);

	orchestrator(&env)
		.ensure_proved(&[record], &keys.nullifier_key, CHAIN_ID, None, None)
		.await
		.unwrap();

	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_callbacks_fire_in_order() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let record = note_with(&keys, 0, NoteCompliance::Unverified);

	let stages: Arc<Mutex<Vec<ComplianceStage>>> = Arc::new(Mutex::new(Vec::new()));
	let verified: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

	let stages_sink = Arc::clone(&stages);
	let verified_sink = Arc::clone(&verified);
	let on_status = move |stage: ComplianceStage, _commitment: &str| {
		stages_sink.lock().unwrap().push(stage);
	};
	let on_verified = move |commitment: &str, tx_hash: &str| {
		verified_sink
			.lock()
			.unwrap()
			.push((commitment.to_string(), tx_hash.to_string()));
	};

	orchestrator(&env)
		.ensure_proved(
			&[record.clone()],
			&keys.nullifier_key,
			CHAIN_ID,
			Some(&on_status),
			Some(&on_verified),
		)
		.await
		.unwrap();

	assert_eq!(
		*stages.lock().unwrap(),
		vec![
			ComplianceStage::FetchingWitness,
			ComplianceStage::GeneratingProof,
			ComplianceStage::Submitting,
		]
	);
	let verified = verified.lock().unwrap();
	assert_eq!(verified.len(), 1);
	assert_eq!(verified[0].0, record.id());
	assert_eq!(verified[0].1, "0xcompliance");
}

#[tokio::test]
async fn test_witness_failure_aborts_batch() {
	let env = TestEnv::with_gate();
	env.relayer.fail_witness.store(true, Ordering::SeqCst);
	let keys = keys();
	let notes = vec![
		note_with(&keys, 0, NoteCompliance::Unverified),
		note_with(&keys, 1, NoteCompliance::Unverified),
	];

	let gate = orchestrator(&env);
	let result = gate
		.ensure_proved(&notes, &keys.nullifier_key, CHAIN_ID, None, None)
		.await;

	assert!(matches!(result, Err(WalletError::RelayerRejected(_))));
	assert_eq!(gate.status(), ComplianceStatus::Error);
	// The first failure stopped the batch before the second witness fetch
	assert_eq!(env.relayer.witness_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_local_verify_failure_is_proof_rejected() {
	let env = TestEnv::with_gate();
	env.prover.verify_ok.store(false, Ordering::SeqCst);
	let keys = keys();
	let notes = vec![note_with(&keys, 0, NoteCompliance::Unverified)];

	let result = orchestrator(&env)
		.ensure_proved(&notes, &keys.nullifier_key, CHAIN_ID, None, None)
		.await;

	assert!(matches!(result, Err(WalletError::ProofRejected(_))));
	assert_eq!(env.relayer.submitted_compliance.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_invocations_do_not_double_prove() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let record = note_with(&keys, 0, NoteCompliance::Unverified);

	let gate = Arc::new(orchestrator(&env));

	gate.ensure_proved(
		std::slice::from_ref(&record),
		&keys.nullifier_key,
		CHAIN_ID,
		None,
		None,
	)
	.await
	.unwrap();

	// Second run: the nullifier is now verified on-chain, so nothing proves
	gate.ensure_proved(
		std::slice::from_ref(&record),
		&keys.nullifier_key,
		CHAIN_ID,
		None,
		None,
	)
	.await
	.unwrap();

	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 1);
	assert_eq!(env.relayer.submitted_compliance.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_invocations_do_not_double_prove() {
	let env = TestEnv::with_gate();
	let keys = keys();
	let record = note_with(&keys, 0, NoteCompliance::Unverified);

	let gate = Arc::new(orchestrator(&env));

	let a = {
		let gate = Arc::clone(&gate);
		let record = record.clone();
		let nullifier_key = keys.nullifier_key;
		tokio::spawn(async move {
			gate.ensure_proved(&[record], &nullifier_key, CHAIN_ID, None, None)
				.await
		})
	};
	let b = {
		let gate = Arc::clone(&gate);
		let record = record.clone();
		let nullifier_key = keys.nullifier_key;
		tokio::spawn(async move {
			gate.ensure_proved(&[record], &nullifier_key, CHAIN_ID, None, None)
				.await
		})
	};

	a.await.unwrap().unwrap();
	b.await.unwrap().unwrap();

	// Whichever interleaving ran, the note was proven exactly once
	assert_eq!(env.prover.prove_calls.load(Ordering::SeqCst), 1);
	assert_eq!(env.relayer.submitted_compliance.load(Ordering::SeqCst), 1);
}
