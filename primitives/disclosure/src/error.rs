//! Error types for view keys and disclosure reports.

use thiserror::Error;

/// Errors raised by view-key parsing and report handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisclosureError {
	/// Malformed serialized view key
	#[error("invalid view key: {0}")]
	InvalidViewKey(String),

	/// Report version this implementation does not understand
	#[error("unsupported report version {0}")]
	UnsupportedVersion(u32),

	/// A block-range report was requested over a note with no block number
	#[error("note {0} has no block number; cannot apply block range")]
	MissingBlockNumber(String),

	/// Malformed field inside a report
	#[error("malformed report field: {0}")]
	MalformedReport(String),
}
