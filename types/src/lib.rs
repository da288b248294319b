//! Fundamental types for the plait scale-out ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: node identifiers, transaction and block hashes, and key material.

pub mod hash;
pub mod keys;
pub mod node_id;

pub use hash::{BlockHash, TxHash};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use node_id::NodeId;
