//! Scale-out ledger core.
//!
//! Every participant keeps a private, append-only, hash-linked chain of its
//! own transactions; only a compact signed digest of each block (its
//! "abstract") is published to the shared main chain. A payment is proven to
//! its receiver by shipping the minimal slice of chain history — the sender's
//! and its transaction-graph ancestors' — that the receiver is not already
//! known to hold.

pub mod block;
pub mod block_abstract;
pub mod chain;
pub mod creator;
pub mod decoder;
pub mod error;
pub mod genesis;
pub mod main_chain;
pub mod meta_knowledge;
pub mod node;
pub mod proof;
pub mod store;
pub mod transaction;

pub use block::{Block, GENESIS_BLOCK_NUMBER};
pub use block_abstract::BlockAbstract;
pub use chain::Chain;
pub use creator::TransactionCreator;
pub use decoder::decode_proof;
pub use error::LedgerError;
pub use genesis::create_genesis;
pub use main_chain::MainChain;
pub use meta_knowledge::MetaKnowledge;
pub use node::{Node, OwnNode};
pub use proof::Proof;
pub use store::LocalStore;
pub use transaction::Transaction;
