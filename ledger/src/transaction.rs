//! Value-transfer records and the source graph.
//!
//! Transactions form a DAG: each spends a set of previously-received
//! transactions (its sources) whose combined unspent value backs the amount,
//! with the leftover returned to the sender as the remainder. Sources must
//! already exist when a transaction is created, so the graph is acyclic by
//! construction.

use plait_crypto::hash_transaction;
use plait_types::{NodeId, TxHash};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A value transfer from `sender` to `receiver`, backed by source transactions.
///
/// Immutable after creation, apart from two one-time memoization fields: the
/// block number stamped when the transaction is placed into a block, and the
/// lazily computed content hash.
pub struct Transaction {
    /// `None` marks a genesis transaction seeding a node's initial holdings.
    sender: Option<NodeId>,
    receiver: NodeId,
    amount: u64,
    /// Leftover value returned to the sender as a new unspent amount.
    remainder: u64,
    /// Spent transactions, deduplicated and kept in canonical (hash) order.
    sources: Vec<Arc<Transaction>>,
    block_number: OnceLock<u64>,
    hash: OnceLock<TxHash>,
}

impl Transaction {
    /// Create a transaction spending `sources`.
    ///
    /// The source set is deduplicated by hash and sorted into canonical order
    /// so that the content hash is deterministic regardless of how the caller
    /// assembled the set.
    pub fn new(
        sender: NodeId,
        receiver: NodeId,
        amount: u64,
        remainder: u64,
        mut sources: Vec<Arc<Transaction>>,
    ) -> Arc<Self> {
        sources.sort_by(|a, b| a.hash().cmp(&b.hash()));
        sources.dedup_by(|a, b| a.hash() == b.hash());
        Arc::new(Self {
            sender: Some(sender),
            receiver,
            amount,
            remainder,
            sources,
            block_number: OnceLock::new(),
            hash: OnceLock::new(),
        })
    }

    /// Create a genesis transaction seeding `receiver` with `amount`.
    pub fn genesis(receiver: NodeId, amount: u64) -> Arc<Self> {
        Arc::new(Self {
            sender: None,
            receiver,
            amount,
            remainder: 0,
            sources: Vec::new(),
            block_number: OnceLock::new(),
            hash: OnceLock::new(),
        })
    }

    pub fn sender(&self) -> Option<NodeId> {
        self.sender
    }

    pub fn receiver(&self) -> NodeId {
        self.receiver
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    pub fn sources(&self) -> &[Arc<Transaction>] {
        &self.sources
    }

    pub fn source_hashes(&self) -> Vec<TxHash> {
        self.sources.iter().map(|s| s.hash()).collect()
    }

    pub fn is_genesis(&self) -> bool {
        self.sender.is_none()
    }

    /// The number of the block this transaction sits in, once stamped.
    pub fn block_number(&self) -> Option<u64> {
        self.block_number.get().copied()
    }

    /// Stamp the containing block's number. The first stamp wins.
    pub(crate) fn stamp_block_number(&self, number: u64) {
        let _ = self.block_number.set(number);
    }

    /// Content hash over sender, receiver, amount, remainder and the source
    /// hashes in canonical order. Computed lazily, cached once.
    pub fn hash(&self) -> TxHash {
        *self.hash.get_or_init(|| {
            let mut buffer = Vec::new();
            if let Some(sender) = self.sender {
                buffer.extend_from_slice(&sender.to_be_bytes());
            }
            buffer.extend_from_slice(&self.receiver.to_be_bytes());
            buffer.extend_from_slice(&self.amount.to_be_bytes());
            buffer.extend_from_slice(&self.remainder.to_be_bytes());
            for source in &self.sources {
                buffer.extend_from_slice(source.hash().as_bytes());
            }
            hash_transaction(&buffer)
        })
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sender {
            Some(sender) => write!(f, "Transaction<{} -> {}, {}>", sender, self.receiver, self.amount),
            None => write!(f, "Transaction<GENESIS -> {}, {}>", self.receiver, self.amount),
        }
    }
}
