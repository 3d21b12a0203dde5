//! # Dust Tree Manager
//!
//! The relayer's server-side mirror of each chain's deposit tree.
//!
//! Every pool contract maintains an on-chain incremental Merkle tree of
//! deposit commitments. The relayer replays the contract's `DepositQueued`
//! event stream into an identical in-memory tree, serves sibling paths to
//! proving clients, and posts fresh roots back on-chain when its local root
//! advances.
//!
//! Invariant: the local tree is a prefix-equivalent projection of the
//! on-chain queue. After inserting the first `n` on-chain commitments the
//! local root equals the contract's root at leaf count `n`.

pub mod error;
pub mod manager;
pub mod ports;

pub use error::TreeManagerError;
pub use manager::{ChainTreeManager, TreeRegistry};
pub use ports::{DepositEvent, DepositEventSource, RootPoster};
