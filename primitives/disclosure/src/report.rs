//! Selective-disclosure reports.
//!
//! A report lists every note a view key can see, together with the blinding
//! factors that open their commitments. Verification recomputes each
//! Poseidon₅ commitment from the disclosed fields, so a doctored amount or
//! owner is caught without any trust in the report's producer.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use dp_zk_core::crypto::field::{strict_from_hex, to_bytes32_hex};
use dp_zk_core::crypto::hash::poseidon_hash_5;
use dp_zk_core::models::note::compute_nullifier;
use dp_zk_core::{Bn254Fr, ChainId, Commitment, NoteRecord, NullifierKey, ViewKey};

use crate::error::DisclosureError;

/// The report format version this implementation produces and accepts
pub const REPORT_VERSION: u32 = 1;

/// Inclusive creation-time window in milliseconds since the epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
	pub from: u64,
	pub to: u64,
}

/// Inclusive block-height window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRange {
	pub start_block: u64,
	pub end_block: u64,
}

/// Optional report filters
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportOptions {
	pub date_range: Option<DateRange>,
	pub block_range: Option<BlockRange>,
}

/// One disclosed note, carrying everything needed to reopen its commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosedNote {
	/// `0x`-hex commitment
	pub commitment: String,
	/// Decimal amount in the smallest unit
	pub amount: String,
	/// `0x`-hex asset id
	pub asset: String,
	pub chain_id: ChainId,
	/// `0x`-hex blinding factor
	pub blinding: String,
	/// -1 for notes still pending confirmation
	pub leaf_index: i64,
	pub spent: bool,
	/// Creation time, milliseconds since the epoch
	pub created_at: u64,
}

/// A self-authenticating disclosure report (version 1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureReport {
	pub version: u32,
	/// `0x`-hex owner public key all notes belong to
	pub owner_pub_key: String,
	pub chain_id: ChainId,
	pub notes: Vec<DisclosedNote>,
	pub total_deposited: String,
	pub total_spent: String,
	pub total_unspent: String,
	pub date_range: Option<DateRange>,
	pub block_range: Option<BlockRange>,
	pub generated_at: u64,
}

/// Verification outcome for a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyOutcome {
	pub valid: bool,
	pub total_notes: usize,
	pub valid_notes: usize,
	pub invalid_notes: usize,
	pub errors: Vec<String>,
}

/// Build a report over `notes` for the holder of `view_key`.
///
/// Includes only notes owned by the view key on the requested chain,
/// excluding dummies. Range filters are inclusive; a block-range request
/// fails if any owned note lacks a block number.
pub fn generate_report(
	notes: &[NoteRecord],
	view_key: &ViewKey,
	chain_id: ChainId,
	options: &ReportOptions,
) -> Result<DisclosureReport, DisclosureError> {
	let mut disclosed = Vec::new();
	let mut total_deposited: u128 = 0;
	let mut total_spent: u128 = 0;
	let mut total_unspent: u128 = 0;

	for record in notes {
		if record.note.owner != view_key.owner_pubkey
			|| record.note.chain_id != chain_id
			|| record.note.amount == 0
		{
			continue;
		}

		if let Some(range) = &options.date_range {
			if record.created_at_ms < range.from || record.created_at_ms > range.to {
				continue;
			}
		}

		if let Some(range) = &options.block_range {
			let block = record
				.block_number
				.ok_or_else(|| DisclosureError::MissingBlockNumber(record.id()))?;
			if block < range.start_block || block > range.end_block {
				continue;
			}
		}

		total_deposited += record.note.amount;
		if record.spent {
			total_spent += record.note.amount;
		} else {
			total_unspent += record.note.amount;
		}

		disclosed.push(DisclosedNote {
			commitment: to_bytes32_hex(&record.commitment.inner()),
			amount: record.note.amount.to_string(),
			asset: to_bytes32_hex(&record.note.asset),
			chain_id: record.note.chain_id,
			blinding: to_bytes32_hex(&record.note.blinding),
			leaf_index: record.leaf_index,
			spent: record.spent,
			created_at: record.created_at_ms,
		});
	}

	Ok(DisclosureReport {
		version: REPORT_VERSION,
		owner_pub_key: to_bytes32_hex(&view_key.owner_pubkey),
		chain_id,
		notes: disclosed,
		total_deposited: total_deposited.to_string(),
		total_spent: total_spent.to_string(),
		total_unspent: total_unspent.to_string(),
		date_range: options.date_range,
		block_range: options.block_range,
		generated_at: now_ms(),
	})
}

/// Verify a report by reopening every disclosed commitment.
pub fn verify_report(report: &DisclosureReport) -> Result<VerifyOutcome, DisclosureError> {
	if report.version != REPORT_VERSION {
		return Err(DisclosureError::UnsupportedVersion(report.version));
	}

	let owner = strict_from_hex(&report.owner_pub_key)
		.map_err(|e| DisclosureError::MalformedReport(format!("ownerPubKey: {e}")))?;

	let mut errors = Vec::new();
	let mut valid_notes = 0usize;

	for (index, note) in report.notes.iter().enumerate() {
		match reopen_commitment(owner, note) {
			Ok(expected) if expected == note.commitment => valid_notes += 1,
			Ok(expected) => errors.push(format!(
				"note {index}: commitment mismatch (claimed {}, recomputed {expected})",
				note.commitment
			)),
			Err(reason) => errors.push(format!("note {index}: {reason}")),
		}
	}

	let total_notes = report.notes.len();
	let invalid_notes = total_notes - valid_notes;
	Ok(VerifyOutcome {
		valid: invalid_notes == 0 && total_notes > 0,
		total_notes,
		valid_notes,
		invalid_notes,
		errors,
	})
}

/// Recompute the `0x`-hex commitment a disclosed note should carry.
fn reopen_commitment(owner: Bn254Fr, note: &DisclosedNote) -> Result<String, String> {
	let amount: u128 = note
		.amount
		.parse()
		.map_err(|_| format!("malformed amount {:?}", note.amount))?;
	let asset = strict_from_hex(&note.asset).map_err(|e| format!("asset: {e}"))?;
	let blinding = strict_from_hex(&note.blinding).map_err(|e| format!("blinding: {e}"))?;

	let commitment = poseidon_hash_5(&[
		owner,
		Bn254Fr::from(amount),
		asset,
		Bn254Fr::from(note.chain_id),
		blinding,
	]);
	Ok(to_bytes32_hex(&commitment))
}

/// Derive the nullifier for every confirmed note in a report.
///
/// Pending notes (`leaf_index < 0`) are skipped: their nullifiers do not
/// exist until the deposit tree assigns them a position.
pub fn compute_report_nullifiers(
	report: &DisclosureReport,
	nullifier_key: &NullifierKey,
) -> Result<BTreeMap<String, String>, DisclosureError> {
	let mut nullifiers = BTreeMap::new();
	for note in &report.notes {
		if note.leaf_index < 0 {
			continue;
		}
		let commitment = strict_from_hex(&note.commitment)
			.map_err(|e| DisclosureError::MalformedReport(format!("commitment: {e}")))?;
		let nullifier = compute_nullifier(
			nullifier_key,
			&Commitment::new(commitment),
			note.leaf_index as u64,
		);
		nullifiers.insert(
			note.commitment.clone(),
			to_bytes32_hex(&nullifier.inner()),
		);
	}
	Ok(nullifiers)
}

fn now_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or(0)
}
