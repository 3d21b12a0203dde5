//! # Dust ZK Core
//!
//! Native cryptographic primitives for the Dust shielded pool.
//!
//! This crate provides the fundamental building blocks for privacy-preserving
//! transactions, without any circuit or transport dependencies.
//!
//! ## Overview
//!
//! The primitives in this crate are used by:
//! - **Wallets**: derive keys, create notes, compute commitments and nullifiers
//! - **Relayer**: recompute commitments while replaying deposit events
//! - **Tests**: unit testing without prover dependencies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer 1: CORE (Foundational Types)                         │
//! │  • Bn254Fr - base field element                             │
//! │  • Commitment / Nullifier / SpendingKey / NullifierKey      │
//! │  • Constants: KDF parameters, domain separators             │
//! │  • CoreError - error taxonomy                               │
//! │                                                             │
//! │  Layer 2: CRYPTO (Cryptographic Operations)                 │
//! │  • field: hex codecs, modular reduction, blinding sampling  │
//! │  • hash: poseidon_hash_1 … poseidon_hash_6                  │
//! │  • keys: PBKDF2 session keys, view keys                     │
//! │  • cipher: AES-256-GCM note encryption at rest              │
//! │                                                             │
//! │  Layer 3: MODELS (High-Level Abstractions)                  │
//! │  • Note { owner, amount, asset, chain_id, blinding }        │
//! │  • NoteRecord - a note tracked by the wallet store          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Compatibility
//!
//! All hash functions are compatible with circomlib/iden3, ensuring that
//! values computed here match those produced inside the circuits and by the
//! on-chain pool contract.

// ============================================================================
// Modules (3-Layer Architecture)
// ============================================================================

/// Layer 1: Core types, constants, and errors
pub mod core;

/// Layer 2: Cryptographic operations
pub mod crypto;

/// Layer 3: High-level models
pub mod models;

pub use crate::core::error::CoreError;
pub use crate::core::types::{
	AssetId, Blinding, Bn254Fr, ChainId, Commitment, EthAddress, MerkleRoot, NullifierKey,
	Nullifier, OwnerPubkey, SpendingKey,
};
pub use crate::crypto::keys::{derive_keys, ScopedViewKey, SessionKeys, ViewKey};
pub use crate::models::note::{ComplianceStatus, Note, NoteRecord};
