//! # Denomination Decomposition
//!
//! Splitting withdrawal amounts into standard denominations makes individual
//! chunks blend with everyone else's. The decomposer is greedy over a fixed
//! descending table, with an absorbing final chunk when a cap on the chunk
//! count is in force.

use crate::error::InputError;

/// ETH denominations in wei, descending:
/// 10, 5, 3, 2, 1, 0.5, 0.3, 0.2, 0.1, 0.05, 0.03, 0.02, 0.01
pub const ETH_DENOMS: [u128; 13] = [
	10_000_000_000_000_000_000,
	5_000_000_000_000_000_000,
	3_000_000_000_000_000_000,
	2_000_000_000_000_000_000,
	1_000_000_000_000_000_000,
	500_000_000_000_000_000,
	300_000_000_000_000_000,
	200_000_000_000_000_000,
	100_000_000_000_000_000,
	50_000_000_000_000_000,
	30_000_000_000_000_000,
	20_000_000_000_000_000,
	10_000_000_000_000_000,
];

/// USDC denominations in 6-decimal units, descending:
/// 10000, 5000, 2000, 1000, 500, 200, 100, 50, 20, 10, 5, 2, 1
pub const USDC_DENOMS: [u128; 13] = [
	10_000_000_000,
	5_000_000_000,
	2_000_000_000,
	1_000_000_000,
	500_000_000,
	200_000_000,
	100_000_000,
	50_000_000,
	20_000_000,
	10_000_000,
	5_000_000,
	2_000_000,
	1_000_000,
];

/// Denomination table for a token symbol.
pub fn denominations_for(symbol: &str) -> Result<&'static [u128], InputError> {
	match symbol.to_ascii_uppercase().as_str() {
		"ETH" | "WETH" => Ok(&ETH_DENOMS),
		"USDC" => Ok(&USDC_DENOMS),
		other => Err(InputError::UnknownDenomTable(other.to_string())),
	}
}

/// Greedily decompose `amount` into denomination chunks.
///
/// - Zero amounts decompose to nothing; an empty table passes the amount
///   through as a single chunk.
/// - Any remainder after the table is exhausted becomes a non-standard
///   trailing chunk.
/// - Under a `max_chunks` cap, the final chunk absorbs everything the first
///   `max_chunks - 1` chunks did not cover.
///
/// The result always sums to `amount` exactly.
pub fn decompose(amount: u128, denominations: &[u128], max_chunks: Option<usize>) -> Vec<u128> {
	if amount == 0 {
		return Vec::new();
	}
	if denominations.is_empty() {
		return vec![amount];
	}

	let mut chunks = Vec::new();
	let mut remaining = amount;
	for &denom in denominations {
		while remaining >= denom {
			chunks.push(denom);
			remaining -= denom;
		}
	}
	if remaining > 0 {
		chunks.push(remaining);
	}

	if let Some(max) = max_chunks {
		if max > 0 && chunks.len() > max {
			let head_sum: u128 = chunks[..max - 1].iter().sum();
			chunks.truncate(max - 1);
			chunks.push(amount - head_sum);
		}
	}

	chunks
}

/// A rounded-down alternative that needs fewer chunks than the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundedSuggestion {
	pub amount: u128,
	pub chunk_count: usize,
}

/// Suggest up to `max_suggestions` rounded-down amounts that decompose into
/// strictly fewer chunks than `amount` does.
///
/// Each suggestion is aligned to one of the standard denominations. Sorted
/// by ascending chunk count, then by descending amount.
pub fn suggest_rounded(
	amount: u128,
	denominations: &[u128],
	max_suggestions: usize,
) -> Vec<RoundedSuggestion> {
	if amount == 0 || denominations.is_empty() || max_suggestions == 0 {
		return Vec::new();
	}

	let baseline = decompose(amount, denominations, None).len();

	let mut suggestions: Vec<RoundedSuggestion> = Vec::new();
	for &denom in denominations {
		let rounded = (amount / denom) * denom;
		if rounded == 0 || rounded == amount {
			continue;
		}
		if suggestions.iter().any(|s| s.amount == rounded) {
			continue;
		}
		let chunk_count = decompose(rounded, denominations, None).len();
		if chunk_count < baseline {
			suggestions.push(RoundedSuggestion {
				amount: rounded,
				chunk_count,
			});
		}
	}

	suggestions.sort_by(|a, b| {
		a.chunk_count
			.cmp(&b.chunk_count)
			.then(b.amount.cmp(&a.amount))
	});
	suggestions.truncate(max_suggestions);
	suggestions
}
