//! Wire message types for plait node-to-node communication.
//!
//! A chain-update bundle carries everything the receiving side's
//! decoder/validator needs to reconstruct and re-verify blocks without
//! re-deriving content from nothing: block numbers, owner ids, per-transaction
//! fields and source hashes, and the transmitted block/transaction hashes.

pub mod codec;
mod error;

pub use error::MessageError;

use plait_types::{BlockHash, NodeId, TxHash};
use serde::{Deserialize, Serialize};

/// A transaction as it travels inside a block message.
///
/// Sources are referenced by hash; the receiver resolves them against the
/// same bundle or its own transaction index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMessage {
    /// `None` marks a genesis transaction.
    pub sender: Option<NodeId>,
    pub receiver: NodeId,
    pub amount: u64,
    pub remainder: u64,
    /// Hashes of the transactions being spent, in canonical (sorted) order.
    pub sources: Vec<TxHash>,
    /// Number of the block this transaction sits in, on the sender's chain.
    pub block_number: u64,
    /// The transmitted transaction hash, re-verified on decode.
    pub hash: TxHash,
}

/// A block as it travels inside a chain-update bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub number: u64,
    /// `None` only for the shared genesis block.
    pub owner: Option<NodeId>,
    /// Number of the predecessor block, `None` for genesis.
    pub previous_number: Option<u64>,
    pub transactions: Vec<TransactionMessage>,
    /// The transmitted block hash, re-verified on decode.
    pub hash: BlockHash,
}

/// A proof bundle: the target transaction plus, per node, the ordered block
/// range the receiver is missing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMessage {
    pub transaction: TransactionMessage,
    /// Per-node block lists, ascending by block number.
    pub chain_updates: Vec<(NodeId, Vec<BlockMessage>)>,
}

impl ProofMessage {
    /// The highest block number shipped for `node`, if any blocks were.
    pub fn highest_block_for(&self, node: NodeId) -> Option<u64> {
        self.chain_updates
            .iter()
            .find(|(id, _)| *id == node)
            .and_then(|(_, blocks)| blocks.last())
            .map(|b| b.number)
    }
}
