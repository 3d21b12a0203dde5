//! # Dust Circuit Inputs
//!
//! Assembles the public and private signals for the five pool circuits:
//!
//! | Circuit | Shape | Public signals |
//! |---|---|---|
//! | deposit | 2 dummies in, 1 real + 1 dummy out | 9 |
//! | withdraw | 1 real + 1 dummy in, change + dummy out | 9 |
//! | transfer | 1 real + 1 dummy in, recipient + change out | 9 |
//! | split | 1 real + 1 dummy in, up to 8 out | 15 |
//! | compliance | SMT non-membership of one input | 2 |
//!
//! Builders validate amounts in `u128` before anything is lifted into the
//! field, freshly sample blindings for every non-dummy output, and fill
//! dummy slots with zero nullifiers and zero paths. The typed input structs
//! serialize to the decimal-string JSON the FFLONK prover consumes.
//!
//! The crate also hosts the denomination decomposer used by the batch-swap
//! flow and the parser for the prover's on-chain calldata format.

pub mod builder;
pub mod calldata;
pub mod compliance;
pub mod denominations;
pub mod error;
pub mod split;
pub mod types;

pub use builder::{build_deposit, build_transfer, build_withdraw};
pub use calldata::{parse_fflonk_calldata, ParsedCalldata, PROOF_WORDS};
pub use compliance::build_compliance;
pub use denominations::{decompose, denominations_for, suggest_rounded, RoundedSuggestion};
pub use error::InputError;
pub use split::build_split;
pub use types::{
	CircuitId, ComplianceCircuitInputs, InputSlot, SplitCircuitInputs, TransactCircuitInputs,
	SPLIT_OUTPUTS,
};
