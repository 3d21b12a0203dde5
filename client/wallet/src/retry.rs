//! Bounded retry with exponential backoff for transient failures.
//!
//! Relayer and RPC calls get an end-to-end timeout and up to three attempts
//! at 1 s, 2 s, 4 s spacing. Semantic failures (4xx, rejected proofs, spent
//! nullifiers) are never retried.

use std::future::Future;
use std::time::Duration;

use crate::error::WalletError;

/// Maximum attempts per operation
pub const MAX_ATTEMPTS: u32 = 3;

/// Per-attempt end-to-end timeout
pub const CALL_TIMEOUT: Duration = Duration::from_secs(45);

/// Run `call` with the retry policy. `operation` names the call in logs.
pub async fn with_retry<T, F, Fut>(operation: &str, mut call: F) -> Result<T, WalletError>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, WalletError>>,
{
	let mut delay = Duration::from_secs(1);
	let mut attempt = 1u32;

	loop {
		let outcome = match tokio::time::timeout(CALL_TIMEOUT, call()).await {
			Ok(result) => result,
			Err(_) => Err(WalletError::RelayerTransient(format!(
				"{operation} timed out after {CALL_TIMEOUT:?}"
			))),
		};

		match outcome {
			Ok(value) => return Ok(value),
			Err(error) if error.is_transient() && attempt < MAX_ATTEMPTS => {
				log::warn!(
					"{operation} failed (attempt {attempt}/{MAX_ATTEMPTS}): {error}; retrying in {delay:?}"
				);
				tokio::time::sleep(delay).await;
				delay *= 2;
				attempt += 1;
			}
			Err(error) => return Err(error),
		}
	}
}
