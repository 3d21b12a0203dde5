//! # Dust Wallet Client
//!
//! The client-side orchestration layer of the shielded pool. Everything
//! stateful or networked is reached through four narrow ports:
//!
//! - [`NoteStore`]: persisted wallet notes (single atomic writer per wallet)
//! - [`RelayerClient`]: the relayer's proof-assembly and submission surface
//! - [`ChainReader`]: the minimal on-chain reads the gate needs
//! - [`ProofBackend`]: the FFLONK prover/verifier pair (or a test mock)
//!
//! On top of the ports sit the two orchestrators:
//!
//! - [`ComplianceOrchestrator`]: before any spend, proves non-membership in
//!   the exclusion set for every input note that is not already verified.
//! - [`SpendCoordinator`]: drives a spend end to end: compliance gate,
//!   Merkle proof, circuit inputs, proof, local verify, submission, and the
//!   atomic store write that marks the input spent and saves the outputs.

pub mod compliance;
pub mod config;
pub mod error;
pub mod ports;
pub mod retry;
pub mod spend;

pub use compliance::{ComplianceOrchestrator, ComplianceStage, ComplianceStatus};
pub use config::ChainConfig;
pub use error::WalletError;
pub use ports::{
	BatchOutcome, ChainReader, ComplianceReceipt, ComplianceWitnessResponse, DepositStatus,
	NoteStore, ProofArtifact, ProofBackend, RelayerClient, TransferReceipt, WithdrawalReceipt,
};
pub use spend::{SpendCoordinator, SpendPhase, SpendReceipt};
